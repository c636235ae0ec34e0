/// Integration tests for tidysort
///
/// These tests simulate real-world usage scenarios, testing the complete
/// end-to-end functionality of the library and the command-line entry point.
///
/// Test categories:
/// 1. Copy and move workflows
/// 2. Collision-free naming
/// 3. Undo and journal bounds
/// 4. Duplicate detection
/// 5. Configuration files and the CLI
use clap::Parser;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tidysort::cli::{Cli, run_cli};
use tidysort::journal::{JournalLoad, MAX_BATCHES};
use tidysort::{
    ClassifyMode, OperationJournal, OperationKind, OperationOutcome, OrganizeError,
    OrganizerConfig, OrganizerConfigBuilder, OrganizerEngine,
};

// ============================================================================
// Test Utilities
// ============================================================================

/// A test fixture with a source tree, a destination root and a private
/// history file, all inside one temporary directory.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    /// Create a new fixture with empty `source/` and `dest/` directories.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("source")).expect("Failed to create source");
        fs::create_dir(temp_dir.path().join("dest")).expect("Failed to create dest");
        TestFixture { temp_dir }
    }

    fn source(&self) -> PathBuf {
        self.temp_dir.path().join("source")
    }

    fn dest(&self) -> PathBuf {
        self.temp_dir.path().join("dest")
    }

    fn journal_path(&self) -> PathBuf {
        self.temp_dir.path().join("history.json")
    }

    /// Create a file with content below the source directory.
    fn create_file(&self, rel_path: &str, content: &[u8]) {
        let file_path = self.source().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    /// Create multiple files at once.
    fn create_files(&self, files: &[(&str, &[u8])]) {
        for (name, content) in files {
            self.create_file(name, content);
        }
    }

    /// An engine backed by this fixture's history file.
    fn engine(&self) -> OrganizerEngine {
        OrganizerEngine::new(OperationJournal::open(self.journal_path()))
    }

    /// A configuration builder with source and destination filled in.
    fn config(&self) -> OrganizerConfigBuilder {
        OrganizerConfig::builder()
            .source(self.source())
            .destination(self.dest())
    }

    /// Assert that a file exists at the given path below the destination.
    fn assert_dest_file(&self, rel_path: &str) {
        let path = self.dest().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    /// Assert that a file exists at the given path below the source.
    fn assert_source_file(&self, rel_path: &str) {
        let path = self.source().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_source_missing(&self, rel_path: &str) {
        let path = self.source().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// Run the CLI with the fixture's history file.
    fn run(&self, args: &[&str]) -> Result<(), String> {
        let journal = self.journal_path();
        let mut argv = vec!["tidysort"];
        argv.extend_from_slice(args);
        argv.push("--journal");
        argv.push(journal.to_str().expect("temp path is UTF-8"));
        let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
        run_cli(cli)
    }

    fn source_arg(&self) -> String {
        self.source().to_string_lossy().into_owned()
    }

    fn dest_arg(&self) -> String {
        self.dest().to_string_lossy().into_owned()
    }
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Copy and Move Workflows
// ============================================================================

#[test]
fn test_copy_text_files_then_find_duplicates_in_full_set() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        ("a.txt", b"0123456789"),
        ("b.txt", b"0123456789"),
        ("c.jpg", &[7u8; 5000]),
    ]);

    let mut engine = fixture.engine();
    let text_only = fixture.config().extensions(["txt"]).build();

    engine.scan(&text_only, |_, _| {}).expect("Scan failed");
    let preview: Vec<_> = engine.preview().into_iter().map(|p| p.name).collect();
    assert_eq!(preview, vec!["a.txt", "b.txt"]);

    let report = engine.execute(&text_only, |_, _| {}).expect("Execute failed");
    assert_eq!(report.summary(), "Processed: 2 files");

    fixture.assert_dest_file("txt/a.txt");
    fixture.assert_dest_file("txt/b.txt");
    assert!(!fixture.dest().join("jpg").exists());
    fixture.assert_source_file("a.txt");
    assert!(engine.journal().is_empty());
    assert!(!fs::read_to_string(fixture.journal_path())
        .unwrap_or_default()
        .contains("\"copy\""));

    let mut unfiltered_engine = fixture.engine();
    let everything = fixture.config().build();
    let duplicates = unfiltered_engine
        .find_duplicates(&everything, |_, _| {})
        .expect("Duplicate search failed");

    assert_eq!(duplicates.groups.len(), 1);
    let names: Vec<_> = duplicates.groups[0]
        .files
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

#[test]
fn test_move_then_undo_restores_original_path() {
    let fixture = TestFixture::new();
    fixture.create_file("report.pdf", b"%PDF-1.7");

    let config = fixture.config().operation(OperationKind::Move).build();
    let mut engine = fixture.engine();
    engine.execute(&config, |_, _| {}).expect("Execute failed");

    fixture.assert_dest_file("pdf/report.pdf");
    fixture.assert_source_missing("report.pdf");
    assert_eq!(engine.journal().len(), 1);
    assert_eq!(engine.journal().batches()[0].operations().len(), 1);

    // A fresh engine reads the history back from disk.
    let mut engine = fixture.engine();
    assert_eq!(engine.journal().load_status(), &JournalLoad::Loaded(1));

    let outcome = OperationOutcome::from(engine.undo(|_, _| {}));
    assert_eq!(outcome, OperationOutcome::success("Restored 1 files"));

    fixture.assert_source_file("report.pdf");
    assert!(!fixture.dest().join("pdf").join("report.pdf").exists());
    assert!(engine.journal().is_empty());
    assert!(fixture.engine().journal().is_empty());
}

#[test]
fn test_classify_by_date_and_size() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.jpg", b"jpeg");

    let mut engine = fixture.engine();
    let by_date = fixture.config().classify(ClassifyMode::Date).build();
    let report = engine.execute(&by_date, |_, _| {}).expect("Execute failed");

    let folder = &report.placed[0].folder;
    assert_eq!(folder.len(), "YYYY/MM".len());
    assert!(report.placed[0].destination.ends_with(Path::new(folder).join("photo.jpg")));

    let by_size = fixture.config().classify(ClassifyMode::Size).build();
    let report = engine.execute(&by_size, |_, _| {}).expect("Execute failed");
    assert_eq!(report.placed[0].folder, "Small (under 1 MB)");
    fixture.assert_dest_file("Small (under 1 MB)/photo.jpg");
}

#[test]
fn test_destination_override_and_missing_extension() {
    let fixture = TestFixture::new();
    fixture.create_files(&[("song.MP3", b"id3"), ("Makefile", b"all:")]);

    let config = fixture
        .config()
        .destination_override("mp3", "Music")
        .build();
    fixture
        .engine()
        .execute(&config, |_, _| {})
        .expect("Execute failed");

    fixture.assert_dest_file("Music/song.MP3");
    fixture.assert_dest_file("no_extension/Makefile");
}

#[test]
fn test_recursive_scan_flattens_into_folders() {
    let fixture = TestFixture::new();
    fixture.create_files(&[("top.txt", b"top"), ("deep/nested/inner.txt", b"inner")]);

    let config = fixture.config().recursive(true).build();
    let report = fixture
        .engine()
        .execute(&config, |_, _| {})
        .expect("Execute failed");

    assert_eq!(report.placed.len(), 2);
    assert_eq!(names_in(&fixture.dest().join("txt")), vec!["inner.txt", "top.txt"]);
}

#[test]
fn test_filters_combine() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        ("Holiday_beach.jpg", &[1u8; 200]),
        ("holiday_draft.jpg", &[2u8; 200]),
        ("holiday_tiny.jpg", &[3u8; 10]),
        ("holiday_notes.txt", &[4u8; 200]),
    ]);

    let config = fixture
        .config()
        .extensions([".JPG"])
        .name_contains("HOLIDAY")
        .name_excludes("draft")
        .min_size(100)
        .max_size(Some(1000))
        .build();

    let mut engine = fixture.engine();
    let names: Vec<_> = engine
        .scan(&config, |_, _| {})
        .expect("Scan failed")
        .iter()
        .map(|f| f.name.clone())
        .collect();
    assert_eq!(names, vec!["Holiday_beach.jpg"]);
}

#[test]
fn test_inverted_size_range_matches_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", b"hello");

    let config = fixture.config().min_size(100).max_size(Some(10)).build();
    let outcome = OperationOutcome::from(fixture.engine().execute(&config, |_, _| {}));

    assert!(!outcome.success);
    assert_eq!(outcome.message, "No files match the current filters");
}

#[test]
fn test_execute_progress_is_monotonic() {
    let fixture = TestFixture::new();
    for i in 0..5 {
        fixture.create_file(&format!("file{}.txt", i), b"x");
    }

    let mut progress = Vec::new();
    fixture
        .engine()
        .execute(&fixture.config().build(), |done, total| progress.push((done, total)))
        .expect("Execute failed");

    assert_eq!(progress, (1..=5).map(|i| (i, 5)).collect::<Vec<_>>());
}

#[test]
fn test_missing_destination_is_reported_before_work() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", b"a");

    let config = OrganizerConfig::builder()
        .source(fixture.source())
        .destination(fixture.dest().join("absent"))
        .operation(OperationKind::Move)
        .build();

    let result = fixture.engine().execute(&config, |_, _| {});
    assert!(matches!(result, Err(OrganizeError::InvalidDestination(_))));
    fixture.assert_source_file("a.txt");
}

// ============================================================================
// Collision-Free Naming
// ============================================================================

#[test]
fn test_repeated_copy_never_overwrites() {
    let fixture = TestFixture::new();
    fixture.create_file("notes.txt", b"v1");

    let config = fixture.config().build();
    let mut engine = fixture.engine();
    for _ in 0..3 {
        engine.execute(&config, |_, _| {}).expect("Execute failed");
    }

    assert_eq!(
        names_in(&fixture.dest().join("txt")),
        vec!["notes.txt", "notes_1.txt", "notes_2.txt"]
    );
    assert_eq!(
        fs::read_to_string(fixture.dest().join("txt").join("notes.txt")).unwrap(),
        "v1"
    );
}

#[test]
fn test_move_into_occupied_folder_renames() {
    let fixture = TestFixture::new();
    fixture.create_file("data.csv", b"new");
    fs::create_dir_all(fixture.dest().join("csv")).unwrap();
    fs::write(fixture.dest().join("csv").join("data.csv"), "old").unwrap();

    let config = fixture.config().operation(OperationKind::Move).build();
    fixture
        .engine()
        .execute(&config, |_, _| {})
        .expect("Execute failed");

    assert_eq!(
        fs::read_to_string(fixture.dest().join("csv").join("data.csv")).unwrap(),
        "old"
    );
    assert_eq!(
        fs::read_to_string(fixture.dest().join("csv").join("data_1.csv")).unwrap(),
        "new"
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_move_and_undo_non_utf8_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = TestFixture::new();
    let odd = OsStr::from_bytes(b"caf\xE9.txt");
    fs::write(fixture.source().join(odd), "latin-1").unwrap();
    fixture.create_file("ok.txt", b"ok");

    let config = fixture.config().operation(OperationKind::Move).build();
    let mut engine = fixture.engine();
    let report = engine.execute(&config, |_, _| {}).expect("Execute failed");

    assert_eq!(report.placed.len(), 2);
    assert!(report.errors.is_empty());
    assert!(fixture.dest().join("txt").join(odd).is_file());
    fixture.assert_dest_file("txt/ok.txt");

    let undo = engine.undo(|_, _| {}).expect("Undo failed");
    assert_eq!(undo.restored, 2);
    assert!(fixture.source().join(odd).is_file());
}

// ============================================================================
// Undo and Journal Bounds
// ============================================================================

#[test]
fn test_undo_restores_whole_batch_and_keeps_earlier_batch() {
    let fixture = TestFixture::new();
    fixture.create_file("first.txt", b"1");

    let move_config = fixture.config().operation(OperationKind::Move).build();
    let mut engine = fixture.engine();
    engine.execute(&move_config, |_, _| {}).expect("Execute failed");

    fixture.create_files(&[("a.log", b"a"), ("b.log", b"b"), ("nested/c.log", b"c")]);
    let second = fixture
        .config()
        .operation(OperationKind::Move)
        .recursive(true)
        .extensions(["log"])
        .build();
    engine.execute(&second, |_, _| {}).expect("Execute failed");
    assert_eq!(engine.journal().len(), 2);

    let mut progress = Vec::new();
    let report = engine
        .undo(|done, total| progress.push((done, total)))
        .expect("Undo failed");

    assert_eq!(report.restored, 3);
    assert!(report.is_complete_success());
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    fixture.assert_source_file("a.log");
    fixture.assert_source_file("nested/c.log");
    fixture.assert_source_missing("first.txt");

    assert_eq!(engine.journal().len(), 1);
    assert_eq!(
        engine.journal().batches()[0].operations()[0].source,
        fixture.source().join("first.txt")
    );
}

#[test]
fn test_undo_recreates_removed_source_directory() {
    let fixture = TestFixture::new();
    fixture.create_file("inbox/scan.pdf", b"pdf");

    let config = fixture
        .config()
        .operation(OperationKind::Move)
        .recursive(true)
        .build();
    let mut engine = fixture.engine();
    engine.execute(&config, |_, _| {}).expect("Execute failed");
    fs::remove_dir(fixture.source().join("inbox")).expect("inbox should be empty");

    let report = engine.undo(|_, _| {}).expect("Undo failed");
    assert_eq!(report.restored, 1);
    fixture.assert_source_file("inbox/scan.pdf");
}

#[test]
fn test_undo_counts_missing_files_as_failures() {
    let fixture = TestFixture::new();
    fixture.create_files(&[("a.txt", b"a"), ("b.txt", b"b")]);

    let config = fixture.config().operation(OperationKind::Move).build();
    let mut engine = fixture.engine();
    engine.execute(&config, |_, _| {}).expect("Execute failed");
    fs::remove_file(fixture.dest().join("txt").join("a.txt")).unwrap();

    let outcome = OperationOutcome::from(engine.undo(|_, _| {}));
    assert!(outcome.success);
    assert_eq!(outcome.message, "Restored: 1 | Errors: 1");
    fixture.assert_source_file("b.txt");
    assert!(engine.journal().is_empty());
}

#[test]
fn test_undo_with_empty_history() {
    let fixture = TestFixture::new();
    let outcome = OperationOutcome::from(fixture.engine().undo(|_, _| {}));
    assert_eq!(outcome, OperationOutcome::failure("Nothing to undo"));
}

#[test]
fn test_journal_keeps_last_twenty_batches() {
    let fixture = TestFixture::new();
    let config = fixture.config().operation(OperationKind::Move).build();
    let mut engine = fixture.engine();

    for i in 0..(MAX_BATCHES + 5) {
        fixture.create_file(&format!("run{:02}.txt", i), b"x");
        engine.execute(&config, |_, _| {}).expect("Execute failed");
        assert!(engine.journal().len() <= MAX_BATCHES);
    }

    let journal = OperationJournal::open(fixture.journal_path());
    assert_eq!(journal.len(), MAX_BATCHES);
    let oldest = &journal.batches()[0].operations()[0].source;
    assert_eq!(oldest, &fixture.source().join("run05.txt"));
}

#[test]
fn test_corrupt_history_starts_empty() {
    let fixture = TestFixture::new();
    fs::write(fixture.journal_path(), "{ not json").unwrap();

    let engine = fixture.engine();
    assert!(engine.journal().is_empty());
    assert!(matches!(
        engine.journal().load_status(),
        JournalLoad::Reset(_)
    ));
}

// ============================================================================
// Duplicate Detection
// ============================================================================

#[test]
fn test_three_identical_one_different() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        ("one.bin", b"AAAAAAAA"),
        ("two.bin", b"AAAAAAAA"),
        ("three.bin", b"AAAAAAAA"),
        ("odd.bin", b"BBBBBBBB"),
        ("unique_size.bin", b"C"),
    ]);

    let mut progress = Vec::new();
    let report = fixture
        .engine()
        .find_duplicates(&fixture.config().build(), |done, total| {
            progress.push((done, total))
        })
        .expect("Duplicate search failed");

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 3);
    assert_eq!(report.duplicate_count(), 2);
    assert_eq!(report.wasted_space(), 16);
    assert_eq!(progress.last(), Some(&(4, 4)));
}

#[test]
fn test_duplicates_reuse_cached_scan() {
    let fixture = TestFixture::new();
    fixture.create_files(&[("a.txt", b"same"), ("b.txt", b"same"), ("c.md", b"same")]);

    let mut engine = fixture.engine();
    let text_only = fixture.config().extensions(["txt"]).build();
    engine.scan(&text_only, |_, _| {}).expect("Scan failed");

    let report = engine
        .find_duplicates(&fixture.config().build(), |_, _| {})
        .expect("Duplicate search failed");
    assert_eq!(report.groups[0].files.len(), 2);
}

// ============================================================================
// Configuration Files and the CLI
// ============================================================================

#[test]
fn test_cli_organize_with_config_file() {
    let fixture = TestFixture::new();
    fixture.create_files(&[("a.pdf", b"pdf"), ("b.jpg", b"jpg"), ("skip.tmp", b"tmp")]);

    let config_path = fixture.temp_dir.path().join("tidysort.toml");
    fs::write(
        &config_path,
        r#"
[organize]
operation = "move"

[filters]
extensions = ["pdf", "jpg"]

[destinations]
pdf = "Documents"
"#,
    )
    .unwrap();

    let (source, dest) = (fixture.source_arg(), fixture.dest_arg());
    fixture
        .run(&[
            "organize",
            &source,
            "--dest",
            &dest,
            "--config",
            config_path.to_str().unwrap(),
        ])
        .expect("organize failed");

    fixture.assert_dest_file("Documents/a.pdf");
    fixture.assert_dest_file("jpg/b.jpg");
    fixture.assert_source_file("skip.tmp");
    fixture.assert_source_missing("a.pdf");

    fixture.run(&["undo"]).expect("undo failed");
    fixture.assert_source_file("a.pdf");
    fixture.assert_source_file("b.jpg");

    let err = fixture.run(&["undo"]).unwrap_err();
    assert_eq!(err, "Nothing to undo");
}

#[test]
fn test_cli_category_flag_selects_presets() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        ("song.mp3", b"mp3"),
        ("font.woff2", b"woff"),
        ("notes.txt", b"txt"),
    ]);

    let (source, dest) = (fixture.source_arg(), fixture.dest_arg());
    fixture
        .run(&["organize", &source, "--dest", &dest, "--category", "audio,fonts"])
        .expect("organize failed");

    fixture.assert_dest_file("mp3/song.mp3");
    fixture.assert_dest_file("woff2/font.woff2");
    assert!(!fixture.dest().join("txt").exists());
}

#[test]
fn test_cli_preview_and_history() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", b"a");

    let source = fixture.source_arg();
    fixture
        .run(&["preview", &source, "--json"])
        .expect("preview failed");
    fixture
        .run(&["history", "--count", "5"])
        .expect("history failed");
    fixture
        .run(&["duplicates", &source])
        .expect("duplicates failed");

    fixture.assert_source_file("a.txt");
    assert!(names_in(&fixture.dest()).is_empty());
}

#[test]
fn test_cli_reports_invalid_source() {
    let fixture = TestFixture::new();
    let missing = fixture.source().join("absent");
    let dest = fixture.dest_arg();

    let err = fixture
        .run(&["organize", missing.to_str().unwrap(), "--dest", &dest])
        .unwrap_err();
    assert!(err.starts_with("Source is not a directory"));
}
