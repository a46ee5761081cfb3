//! Deciding which outbox entries become pages.
//!
//! [`classify`] is the only place that looks at a post's type and object
//! together. What it hands out for archivable posts, [`Archivable`], already
//! holds the [`PostBody`], so the renderer never has to inspect a post again.

use crate::events::{ArchiveEvent, Reporter};
use crate::types::{Post, PostBody, PostObject};

/// A post that gets a page, paired with its body.
#[derive(Debug, Clone, Copy)]
pub struct Archivable<'a> {
    pub post: &'a Post,
    pub body: &'a PostBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The post's type never produces a page (e.g. boosts).
    NotArchivable,
    /// The type is archivable but the object is only a reference.
    NoLocalBody,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotArchivable => "not archivable",
            SkipReason::NoLocalBody => "no local body",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Verdict<'a> {
    Archive(Archivable<'a>),
    Skip(SkipReason),
}

pub fn classify(post: &Post) -> Verdict<'_> {
    if !post.kind.is_archivable() {
        return Verdict::Skip(SkipReason::NotArchivable);
    }
    match &post.object {
        PostObject::Body(body) => Verdict::Archive(Archivable { post, body }),
        PostObject::Reference(_) => Verdict::Skip(SkipReason::NoLocalBody),
    }
}

/// Like [`classify`], reporting every skipped post.
pub fn select<'a>(post: &'a Post, reporter: &Reporter) -> Option<Archivable<'a>> {
    match classify(post) {
        Verdict::Archive(archivable) => Some(archivable),
        Verdict::Skip(reason) => {
            reporter.emit(ArchiveEvent::Skipped {
                id: post.id.clone(),
                actor: post.actor.clone(),
                kind: post.kind,
                reason,
            });
            None
        }
    }
}
