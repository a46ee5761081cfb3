//! Post records read from the export's outbox.
//!
//! The outbox is an ActivityStreams collection. Each entry is an activity
//! wrapping the actual status: `Create` activities carry the full status body,
//! `Announce` activities (boosts) only carry a reference to somebody else's
//! status, which is not part of the export.
//!
//! All types here are read-only once constructed. [`validate_record`] is the
//! only way the rest of the crate builds a [`Post`], so every invariant checked
//! there holds for the whole run:
//!
//! - `published` carries an explicit UTC offset
//! - `mediaType` is one of the formats in [`MediaType`]
//! - every `Create` post has its body available as [`PostObject::Body`]

use chrono::{DateTime, FixedOffset};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Media formats an attachment may have.
///
/// This is a closed set: anything else in the export is a validation error
/// rather than an attachment we silently can't display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Mp4,
    Jpeg,
    Png,
    Mpeg,
}

/// How an attachment is presented on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Mp4,
        MediaType::Jpeg,
        MediaType::Png,
        MediaType::Mpeg,
    ];

    /// The MIME type as it appears in the export.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Mp4 => "video/mp4",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Mpeg => "audio/mpeg",
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            MediaType::Jpeg | MediaType::Png => MediaKind::Image,
            MediaType::Mp4 => MediaKind::Video,
            MediaType::Mpeg => MediaKind::Audio,
        }
    }
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = MediaType::ALL.iter().map(|m| m.as_str()).collect();
                format!(
                    "unsupported mediaType `{}` (expected one of {})",
                    s,
                    known.join(", ")
                )
            })
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Activity type of an outbox entry.
///
/// Whether a type produces a page is decided by [`PostType::is_archivable`];
/// adding a type means adding a variant here and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostType {
    /// A boost of another status. The boosted status is not in the export.
    Announce,
    /// An original status.
    Create,
}

impl PostType {
    pub const ALL: [PostType; 2] = [PostType::Announce, PostType::Create];

    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Announce => "Announce",
            PostType::Create => "Create",
        }
    }

    /// Whether posts of this type get their own page in the archive.
    pub fn is_archivable(self) -> bool {
        match self {
            PostType::Announce => false,
            PostType::Create => true,
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unsupported post type `{}` (expected Announce or Create)", s))
    }
}

impl<'de> Deserialize<'de> for PostType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// One media item attached to a status.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Absolute or export-relative location of the file.
    pub url: String,
    pub media_type: MediaType,
    /// Alt text. Absent and `null` both mean "no description".
    pub name: Option<String>,
}

/// The content of an original status.
#[derive(Debug, Clone, PartialEq)]
pub struct PostBody {
    /// Canonical public URL; the output path is derived from it.
    pub url: String,
    /// Status HTML as produced by the server. Already sanitized upstream.
    pub content: String,
    pub attachment: Vec<Attachment>,
}

/// The `object` of an outbox entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PostObject {
    Body(PostBody),
    /// A bare reference (usually a URL) to an object that is not in the export.
    Reference(String),
}

/// One entry of the outbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Unique per the source server; not checked here.
    pub id: String,
    pub kind: PostType,
    pub actor: String,
    pub published: DateTime<FixedOffset>,
    pub object: PostObject,
}

impl Post {
    /// The status body, if this entry carries one.
    pub fn body(&self) -> Option<&PostBody> {
        match &self.object {
            PostObject::Body(body) => Some(body),
            PostObject::Reference(_) => None,
        }
    }
}

/// Why a single outbox entry was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    /// The entry's `id`, if it had a readable one.
    pub id: Option<String>,
    pub reason: String,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "record `{}`: {}", id, self.reason),
            None => write!(f, "record without id: {}", self.reason),
        }
    }
}

/// Turn one raw outbox entry into a [`Post`], enforcing every invariant
/// documented at the module level.
///
/// Rejections name the offending field by its full path within the record,
/// e.g. `object.attachment[0].url`.
pub fn validate_record(raw: Value) -> Result<Post, RecordError> {
    let id = raw.get("id").and_then(Value::as_str).map(str::to_owned);
    parse_post(&raw).map_err(|reason| RecordError { id, reason })
}

fn parse_post(raw: &Value) -> Result<Post, String> {
    let record = Fields::root(raw)?;
    let kind: PostType = record.required("type")?;
    let published: String = record.required("published")?;

    let post = Post {
        id: record.required("id")?,
        kind,
        actor: record.required("actor")?,
        published: aware_timestamp(&published)?,
        object: parse_object(&record)?,
    };

    if post.kind.is_archivable() && post.body().is_none() {
        return Err(format!(
            "invalid `object`: a {} post must carry its body, found a bare reference",
            post.kind
        ));
    }
    Ok(post)
}

/// Tries the structured form first and falls back to a plain string.
fn parse_object(record: &Fields) -> Result<PostObject, String> {
    let path = record.path("object");
    let value = record.get("object")?;
    match value {
        Value::String(reference) => Ok(PostObject::Reference(reference.clone())),
        Value::Object(_) => {
            let object = Fields::nested(value, path)?;
            Ok(PostObject::Body(PostBody {
                url: object.required("url")?,
                content: object.required("content")?,
                attachment: parse_attachments(&object)?,
            }))
        }
        other => Err(format!(
            "invalid `{}`: expected a post body or a string reference, found {}",
            path,
            json_kind(other)
        )),
    }
}

fn parse_attachments(object: &Fields) -> Result<Vec<Attachment>, String> {
    let path = object.path("attachment");
    let value = object.get("attachment")?;
    let Value::Array(items) = value else {
        return Err(format!(
            "invalid `{}`: expected an array, found {}",
            path,
            json_kind(value)
        ));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let attachment = Fields::nested(item, format!("{}[{}]", path, i))?;
            Ok(Attachment {
                url: attachment.required("url")?,
                media_type: attachment.required("mediaType")?,
                name: attachment.optional("name")?,
            })
        })
        .collect()
}

/// The fields of one JSON object, with the object's path inside the record
/// so errors can point at exactly the offending field.
struct Fields<'a> {
    prefix: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, String> {
        Self::nested(value, String::new())
    }

    fn nested(value: &'a Value, prefix: String) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Fields { prefix, map }),
            other if prefix.is_empty() => {
                Err(format!("expected an object, found {}", json_kind(other)))
            }
            other => Err(format!(
                "invalid `{}`: expected an object, found {}",
                prefix,
                json_kind(other)
            )),
        }
    }

    fn path(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    fn get(&self, name: &str) -> Result<&'a Value, String> {
        self.map
            .get(name)
            .ok_or_else(|| format!("missing field `{}`", self.path(name)))
    }

    fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, String> {
        T::deserialize(self.get(name)?)
            .map_err(|e| format!("invalid `{}`: {}", self.path(name), e))
    }

    /// Absent and `null` are both `None`.
    fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, String> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.required(name).map(Some),
        }
    }
}

/// Parses RFC 3339 timestamps, which always carry an offset. Naive timestamps
/// are rejected rather than guessed at.
fn aware_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| {
        format!(
            "invalid `published` timestamp `{}` ({}): an explicit UTC offset is required",
            raw, e
        )
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
