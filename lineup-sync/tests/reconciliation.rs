use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use lineup_core::ledger;
use lineup_core::types::{Bucket, EntityKey};
use lineup_sync::{run_at, FailureKind, RunOptions, RunReport};
use serde_json::json;
use tempfile::TempDir;

#[derive(Clone, Copy)]
struct Row<'a> {
    email: &'a str,
    name: &'a str,
    session: &'a str,
    level: &'a str,
    title: &'a str,
}

fn row<'a>(email: &'a str, name: &'a str, session: &'a str, level: &'a str) -> Row<'a> {
    Row {
        email,
        name,
        session,
        level,
        title: "Talk",
    }
}

fn write_rows(root: &Path, rows: &[Row]) {
    let mut yaml = String::new();
    for r in rows {
        yaml.push_str(&format!(
            "- Email Address: \"{}\"\n  Speaker Name: \"{}\"\n  Session_ID: \"{}\"\n  \
             Session Level: \"{}\"\n  Title of Session: \"{}\"\n",
            r.email, r.name, r.session, r.level, r.title
        ));
    }
    if rows.is_empty() {
        yaml.push_str("[]\n");
    }
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/submissions.yaml"), yaml).unwrap();
}

fn session_page(root: &Path, code: &str) -> PathBuf {
    root.join("generated_files/content/sessions")
        .join(format!("{code}.md"))
}

fn speaker_profile(root: &Path, slug: &str) -> PathBuf {
    root.join("generated_files/content/speakers")
        .join(slug)
        .join("index.md")
}

fn ledger_path(root: &Path) -> PathBuf {
    root.join("data/session_id_mapping.json")
}

fn ledger_json(root: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(ledger_path(root)).unwrap()).unwrap()
}

fn run(root: &Path) -> RunReport {
    run_at(root, RunOptions::default()).expect("run")
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn single_new_session_gets_first_code_of_its_bucket() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let talk = Row {
        title: "Talk A",
        ..row("ada@example.com", "Ada", "S1", "200")
    };
    write_rows(root, &[talk]);

    let report = run(root);

    assert_eq!(report.sessions.created, 1);
    assert_eq!(
        ledger_json(root),
        json!({ "mapping": { "S1": "B201" }, "counters": { "2": 1 } })
    );
    let page = fs::read_to_string(session_page(root, "B201")).unwrap();
    assert!(page.contains("title: \"Talk A\""));
}

#[test]
fn unchanged_dataset_second_run_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(
        root,
        &[
            row("ada@example.com", "Ada Lovelace", "S1", "200"),
            row("bob@example.com", "Bob Babbage", "S2", "300"),
        ],
    );
    run(root);
    let ledger_before = fs::read_to_string(ledger_path(root)).unwrap();

    let old = FileTime::from_unix_time(1_000_000, 0);
    let page = session_page(root, "B201");
    let profile = speaker_profile(root, "ada-lovelace");
    filetime::set_file_mtime(&page, old).unwrap();
    filetime::set_file_mtime(&profile, old).unwrap();

    let second = run(root);

    assert_eq!(second.sessions.changed(), 0);
    assert_eq!(second.speakers.changed(), 0);
    assert_eq!(second.sessions.skipped, 2);
    assert!(second.is_noop());
    assert_eq!(fs::read_to_string(ledger_path(root)).unwrap(), ledger_before);
    let mtime = |p: &Path| FileTime::from_last_modification_time(&fs::metadata(p).unwrap());
    assert_eq!(mtime(&page), old, "skipped page was rewritten");
    assert_eq!(mtime(&profile), old, "skipped profile was rewritten");
}

#[test]
fn code_is_stable_across_runs_and_level_changes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "400")]);
    run(root);
    assert!(session_page(root, "B401").exists());

    write_rows(root, &[row("ada@example.com", "Ada", "S1", "100")]);
    let report = run(root);

    assert_eq!(report.sessions.created, 0);
    let loaded = ledger::load_at(&ledger_path(root)).unwrap();
    assert_eq!(loaded.code_for(&EntityKey::from("S1")), Some("B401"));
    assert!(!session_page(root, "B101").exists());
}

#[test]
fn failed_write_does_not_consume_a_code() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    // A plain file where the sessions directory belongs blocks every page.
    let sessions_dir = root.join("generated_files/content/sessions");
    fs::create_dir_all(sessions_dir.parent().unwrap()).unwrap();
    fs::write(&sessions_dir, "blocker").unwrap();

    let report = run(root);

    assert_eq!(report.sessions.failed, 1);
    assert_eq!(report.failures[0].kind, FailureKind::Write);
    assert_eq!(report.speakers.created, 1, "other entities still processed");
    let loaded = ledger::load_at(&ledger_path(root)).unwrap();
    assert_eq!(loaded.counter(Bucket(2)), 0);
    assert!(loaded.is_empty());

    fs::remove_file(&sessions_dir).unwrap();
    run(root);
    assert!(session_page(root, "B201").exists());
}

#[test]
fn orphan_is_removed_but_keeps_its_code_when_it_returns() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let both = [
        row("ada@example.com", "Ada", "S1", "200"),
        row("bob@example.com", "Bob", "S2", "200"),
    ];
    write_rows(root, &both);
    run(root);
    assert!(session_page(root, "B202").exists());

    write_rows(root, &both[..1]);
    let report = run(root);
    assert_eq!(report.removed_sessions, vec!["B202".to_string()]);
    assert_eq!(report.removed_speakers, vec!["bob".to_string()]);
    assert!(!session_page(root, "B202").exists());
    assert!(!speaker_profile(root, "bob").exists());
    assert_eq!(ledger_json(root)["mapping"]["S2"], "B202");
    assert_eq!(ledger_json(root)["counters"]["2"], 2);

    // A newcomer must not take the freed number.
    write_rows(root, &[both[0], row("cy@example.com", "Cy", "S3", "200")]);
    run(root);
    assert!(session_page(root, "B203").exists());

    write_rows(root, &both);
    let report = run(root);
    assert_eq!(report.sessions.created, 1);
    assert!(session_page(root, "B202").exists());
    let page = fs::read_to_string(session_page(root, "B202")).unwrap();
    assert!(page.contains("id: \"S2\""));
}

#[test]
fn same_name_speakers_get_suffixed_slugs() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(
        root,
        &[
            row("one@example.com", "Sam Lee", "S1", "200"),
            row("two@example.com", "Sam Lee", "S2", "200"),
        ],
    );
    let report = run(root);

    assert_eq!(report.speakers.created, 2);
    assert!(speaker_profile(root, "sam-lee").exists());
    assert!(speaker_profile(root, "sam-lee-2").exists());
}

#[test]
fn reordered_speaker_list_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(
        root,
        &[
            row("ada@example.com", "Ada", "S1", "200"),
            row("bob@example.com", "Bob", "S1", "200"),
        ],
    );
    run(root);
    let page = session_page(root, "B201");
    let original = fs::read_to_string(&page).unwrap();
    assert!(original.contains("speakers:\n    - \"ada\"\n    - \"bob\"\n"));

    write_rows(
        root,
        &[
            row("bob@example.com", "Bob", "S1", "200"),
            row("ada@example.com", "Ada", "S1", "200"),
        ],
    );
    let report = run(root);

    assert_eq!(report.sessions.skipped, 1);
    assert_eq!(report.sessions.updated, 0);
    assert_eq!(fs::read_to_string(&page).unwrap(), original);
}

#[test]
fn changed_title_updates_in_place() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    run(root);

    let renamed = Row {
        title: "Renamed",
        ..row("ada@example.com", "Ada", "S1", "200")
    };
    write_rows(root, &[renamed]);
    let report = run(root);

    assert_eq!(report.sessions.updated, 1);
    let page = fs::read_to_string(session_page(root, "B201")).unwrap();
    assert!(page.contains("title: \"Renamed\""));
}

#[test]
fn force_rewrites_everything() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    run(root);

    let options = RunOptions {
        force: true,
        ..RunOptions::default()
    };
    let report = run_at(root, options).unwrap();
    assert_eq!(report.sessions.updated, 1);
    assert_eq!(report.speakers.updated, 1);
    assert_eq!(report.sessions.skipped + report.speakers.skipped, 0);
}

#[test]
fn force_repairs_a_page_that_is_not_utf8() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    run(root);
    fs::write(session_page(root, "B201"), b"---\ntitle: \"caf\xe9\"\n---\n").unwrap();

    let options = RunOptions {
        force: true,
        ..RunOptions::default()
    };
    let report = run_at(root, options).unwrap();

    assert_eq!(report.sessions.updated, 1);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    let page = fs::read_to_string(session_page(root, "B201")).unwrap();
    assert!(page.contains("title: \"Talk\""));
}

#[test]
fn non_utf8_page_for_a_new_key_is_rewritten_and_committed() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    let page = session_page(root, "B201");
    fs::create_dir_all(page.parent().unwrap()).unwrap();
    fs::write(&page, b"\xff\xfe stale bytes").unwrap();

    let report = run(root);

    assert_eq!(report.sessions.updated, 1);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(ledger_json(root)["mapping"]["S1"], "B201");
    assert!(fs::read_to_string(&page).is_ok());
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let report = run_at(root, options).unwrap();

    assert_eq!(report.sessions.created, 1);
    assert!(report.dry_run);
    assert!(!ledger_path(root).exists());
    assert!(!root.join("generated_files").exists());
}

#[test]
fn unreadable_ledger_aborts_the_run() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    fs::write(ledger_path(root), "{ not json").unwrap();

    let err = run_at(root, RunOptions::default()).unwrap_err();
    assert!(err.is_ledger_failure(), "{err}");
    assert!(!root.join("generated_files").exists());
}

#[test]
fn legacy_ledger_is_honoured_and_upgraded() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(
        root,
        &[
            row("ada@example.com", "Ada", "S1", "200"),
            row("bob@example.com", "Bob", "S2", "200"),
        ],
    );
    fs::write(
        ledger_path(root),
        r#"{"session_id_mapping": {"S1": "B205.md"}, "level_counters": {"2": "5"}}"#,
    )
    .unwrap();

    run(root);

    assert!(session_page(root, "B205").exists());
    assert!(session_page(root, "B206").exists());
    assert_eq!(
        ledger_json(root),
        json!({ "mapping": { "S1": "B205", "S2": "B206" }, "counters": { "2": 6 } })
    );
}

#[test]
fn broken_template_override_is_a_render_failure() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    fs::write(root.join("lineup.yaml"), "templates_dir: templates\n").unwrap();
    fs::create_dir_all(root.join("templates/session")).unwrap();
    fs::write(root.join("templates/session/page.md.tera"), "{{ no_such_field }}").unwrap();

    let report = run(root);

    assert_eq!(report.sessions.failed, 1);
    assert_eq!(report.failures[0].kind, FailureKind::Render);
    assert_eq!(report.speakers.created, 1);
    let loaded = ledger::load_at(&ledger_path(root)).unwrap();
    assert_eq!(loaded.counter(Bucket(2)), 0);
}

#[test]
fn config_overrides_prefix_and_output_dir() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "300")]);
    fs::write(root.join("lineup.yaml"), "code_prefix: X\noutput_dir: site\n").unwrap();

    run(root);

    assert!(root.join("site/content/sessions/X301.md").exists());
    assert_eq!(ledger_json(root)["mapping"]["S1"], "X301");
}

#[test]
fn empty_code_prefix_aborts_before_any_write() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_rows(root, &[row("ada@example.com", "Ada", "S1", "200")]);
    fs::write(root.join("lineup.yaml"), "code_prefix: \"\"\n").unwrap();

    let err = run_at(root, RunOptions::default()).unwrap_err();

    assert!(err.to_string().contains("code_prefix"), "got: {err}");
    assert!(!root.join("generated_files").exists());
    assert!(!ledger_path(root).exists());
}
