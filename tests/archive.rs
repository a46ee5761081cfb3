//! End-to-end tests over the bundled fixture export.
//!
//! The fixture outbox holds three original posts (text only; image + video;
//! audio) and one boost. Tests read the fixtures in place and write to a
//! temp directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use tempfile::TempDir;
use toot_archive::archive::{self, ErrorKind};
use toot_archive::config::ArchiveConfig;
use toot_archive::events::{ArchiveEvent, Reporter};

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn fixture_config(output_dir: &Path) -> ArchiveConfig {
    ArchiveConfig {
        input_dir: root().join("fixtures/export"),
        template_dir: root().join("templates"),
        static_dir: root().join("fixtures/static"),
        base_prefix_url: "https://example.social/@user/".to_string(),
        base_prefix_media: "socialexample/".to_string(),
        output_dir: output_dir.to_path_buf(),
    }
}

fn page(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join("user").join(format!("{id}.html"))
}

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

#[test]
fn builds_one_page_per_original_post() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    let config = fixture_config(&out);

    let summary = archive::generate(&config, &Reporter::silent()).unwrap();

    assert_eq!(summary.loaded, 4);
    assert_eq!(
        summary.pages,
        vec![
            page(&out, "110000000000000001"),
            page(&out, "110000000000000003"),
            page(&out, "110000000000000004"),
        ]
    );
    assert_eq!(
        summary.skipped,
        vec!["https://example.social/users/user/statuses/110000000000000002/activity"]
    );
    for path in &summary.pages {
        assert!(path.is_file(), "missing {}", path.display());
    }
    assert!(!page(&out, "110000000000000002").exists());
}

#[test]
fn pages_carry_content_and_escaped_alt_text() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    archive::generate(&fixture_config(&out), &Reporter::silent()).unwrap();

    let html = fs::read_to_string(page(&out, "110000000000000003")).unwrap();
    assert!(html.contains("<p>Sunset over the harbour &amp; a short clip of the waves.</p>"));
    assert!(html.contains(
        "alt=\"Orange sky above &quot;the&quot; harbour &lt;at dusk&gt;\""
    ));
    let video = html.find("<video").expect("video element");
    assert!(html[video..].contains("waves.mp4\" controls>"));
    assert!(html.contains("2023-03-05T12:15:00+01:00"));

    let first = fs::read_to_string(page(&out, "110000000000000001")).unwrap();
    assert!(first.contains("class=\"mention hashtag\""));
    assert!(!first.contains("<img"));

    let audio = fs::read_to_string(page(&out, "110000000000000004")).unwrap();
    assert!(audio.contains("<audio"));
}

#[test]
fn copies_static_assets_and_media() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    archive::generate(&fixture_config(&out), &Reporter::silent()).unwrap();

    assert!(out.join("css/style.css").is_file());
    assert!(out.join("fonts/body.woff2").is_file());
    assert!(out.join("img/avatar.svg").is_file());
    let media = out.join("socialexample/media_attachments/files/110");
    assert!(media.join("001/original/sunset.jpg").is_file());
    assert!(media.join("002/original/waves.mp4").is_file());
    assert!(media.join("002/original/note.mp3").is_file());
}

#[test]
fn events_audit_the_run() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    let (tx, rx) = mpsc::channel();
    {
        let reporter = Reporter::new(Some(tx));
        archive::generate(&fixture_config(&out), &reporter).unwrap();
    }
    let events: Vec<ArchiveEvent> = rx.iter().collect();

    assert_eq!(events.first(), Some(&ArchiveEvent::Loaded { posts: 4 }));
    let count = |f: fn(&ArchiveEvent) -> bool| events.iter().filter(|e| f(e)).count();
    assert_eq!(count(|e| matches!(e, ArchiveEvent::Skipped { .. })), 1);
    assert_eq!(count(|e| matches!(e, ArchiveEvent::Copied { .. })), 4);
    assert_eq!(count(|e| matches!(e, ArchiveEvent::PageWritten { .. })), 3);
}

#[test]
fn rebuild_is_identical_and_keeps_foreign_files() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    let config = fixture_config(&out);

    let first = archive::generate(&config, &Reporter::silent()).unwrap();
    let snapshot: Vec<String> = first
        .pages
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    fs::write(out.join("index.html"), "hand-written").unwrap();

    let second = archive::generate(&config, &Reporter::silent()).unwrap();
    let again: Vec<String> = second
        .pages
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();

    assert_eq!(snapshot, again);
    assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "hand-written");
}

#[test]
fn wrong_prefix_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    let config = ArchiveConfig {
        base_prefix_url: "https://elsewhere.social/@user/".to_string(),
        ..fixture_config(&out)
    };

    let err = archive::generate(&config, &Reporter::silent()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("https://elsewhere.social/@user/"));
    assert!(!out.exists());
}

#[test]
fn bundled_static_tree_copies_only_assets() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    let config = ArchiveConfig {
        static_dir: root().join("static"),
        ..fixture_config(&out)
    };

    archive::generate(&config, &Reporter::silent()).unwrap();

    assert!(out.join("css/style.css").is_file());
    assert!(out.join("img/favicon.svg").is_file());
    assert!(out.join("fonts").is_dir());
    let visible: Vec<_> = fs::read_dir(out.join("fonts"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|name| !name.to_string_lossy().starts_with('.'))
        .collect();
    assert!(visible.is_empty(), "unexpected files in fonts/: {visible:?}");
}

#[test]
fn check_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");
    let summary = archive::check(&fixture_config(&out), &Reporter::silent()).unwrap();
    assert_eq!(summary.pages.len(), 3);
    assert_eq!(summary.skipped.len(), 1);
    assert!(!out.exists());
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

fn cli(config_dir: &Path, out: &Path, command: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_toot-archive"))
        .arg(command)
        .arg("--config-dir")
        .arg(config_dir)
        .arg("--input")
        .arg(root().join("fixtures/export"))
        .arg("--templates")
        .arg(root().join("templates"))
        .arg("--static-dir")
        .arg(root().join("fixtures/static"))
        .arg("--output")
        .arg(out)
        .args(["--base-url", "https://example.social/@user/"])
        .args(["--media-prefix", "socialexample/"])
        .output()
        .unwrap()
}

#[test]
fn cli_build_prints_pages_and_summary() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");

    let result = cli(tmp.path(), &out, "build");
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(
        result.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(stdout.contains("Loaded 4 posts"), "{stdout}");
    assert!(stdout.contains("user/110000000000000003.html"), "{stdout}");
    assert!(stdout.contains("Archived 3 posts, skipped 1"), "{stdout}");
    assert!(page(&out, "110000000000000001").is_file());
}

#[test]
fn cli_check_leaves_output_alone() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("site");

    let result = cli(tmp.path(), &out, "check");
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(result.status.success());
    assert!(stdout.contains("4 posts: 3 pages, 1 skipped"), "{stdout}");
    assert!(!out.exists());
}

#[test]
fn cli_fails_on_invalid_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "ouput_dir = \"x\"\n").unwrap();

    let result = cli(tmp.path(), &tmp.path().join("site"), "build");
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("unknown field"));
}

#[test]
fn cli_reports_errors_as_readable_text() {
    let tmp = TempDir::new().unwrap();
    let export = tmp.path().join("export");
    fs::create_dir_all(&export).unwrap();
    fs::write(
        export.join("outbox.json"),
        r#"{"orderedItems": [{"id": "x", "type": "Create", "actor": 7}]}"#,
    )
    .unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_toot-archive"))
        .arg("build")
        .arg("--config-dir")
        .arg(tmp.path())
        .arg("--input")
        .arg(&export)
        .arg("--output")
        .arg(tmp.path().join("site"))
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Error: Invalid post at orderedItems[0] (id x)"), "{stderr}");
    assert!(!stderr.contains("Validation {"), "{stderr}");
    assert!(!tmp.path().join("site").exists());
}

#[test]
fn cli_gen_config_prints_stock_config() {
    let result = Command::new(env!("CARGO_BIN_EXE_toot-archive"))
        .arg("gen-config")
        .output()
        .unwrap();
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    let parsed: ArchiveConfig = toml::from_str(&stdout).unwrap();
    assert_eq!(parsed, ArchiveConfig::default());
}
