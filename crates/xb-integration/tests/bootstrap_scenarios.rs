//! End-to-end bootstrap scenarios against in-memory archives and directories

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use xb_core::{FetchError, Keymap, VfsError};
use xb_integration::{BootReport, BootState, Bootstrap, DryRunLauncher};
use xb_loader::{ManifestLocation, StartMode};
use xb_vfs::{FetchResponse, Fetcher, ResourceWriter};
use zip::write::FileOptions;
use zip::ZipWriter;

#[derive(Default)]
struct MockFetcher {
    responses: HashMap<String, FetchResponse>,
}

impl MockFetcher {
    fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), FetchResponse::ok(body));
        self
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(FetchResponse::not_found))
    }
}

/// Records every write and lazy registration
#[derive(Default)]
struct RecordingWriter {
    writes: Mutex<Vec<(String, Vec<u8>)>>,
    lazy: Mutex<Vec<(String, String)>>,
}

impl RecordingWriter {
    fn written_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.writes.lock().iter().map(|(n, _)| n.clone()).collect();
        names.sort();
        names
    }
}

impl ResourceWriter for RecordingWriter {
    async fn write(&self, name: &str, bytes: Vec<u8>) -> Result<(), VfsError> {
        self.writes.lock().push((name.to_string(), bytes));
        Ok(())
    }

    fn register_lazy(&self, name: &str, url: &str) -> Result<(), VfsError> {
        self.lazy.lock().push((name.to_string(), url.to_string()));
        Ok(())
    }
}

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const ARCHIVE_URL: &str = "https://host/games/demo.zip";

async fn boot_archive(zip: Vec<u8>, writer: &RecordingWriter) -> (BootReport, DryRunLauncher) {
    let fetcher = MockFetcher::default().serve(ARCHIVE_URL, zip);
    let location = ManifestLocation::parse(ARCHIVE_URL);
    let mut boot = Bootstrap::new(Keymap::default(), location, fetcher, writer);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await.unwrap();
    assert!(boot.gate().is_satisfied());
    (report, launcher)
}

#[tokio::test]
async fn test_archive_with_start_program() {
    let zip = build_zip(&[
        (
            "manifest.json",
            br#"{"resources":["a.prg","b.txt"],"start_prg":"a.prg"}"#,
        ),
        ("a.prg", &[0x01, 0x08, 0x0b, 0x08]),
        ("b.txt", b"readme"),
    ]);
    let writer = RecordingWriter::default();
    let (report, launcher) = boot_archive(zip, &writer).await;

    assert_eq!(writer.written_names(), vec!["a.prg", "b.txt"]);
    assert_eq!(report.args, vec!["-keymap", "en-us", "-prg", "a.prg", "-run"]);
    assert_eq!(launcher.args(), Some(report.args.as_slice()));
    assert_eq!(report.state, BootState::Ready);
    assert!(report.diagnostics.is_empty());
}

#[tokio::test]
async fn test_archive_missing_resource() {
    let zip = build_zip(&[
        (
            "manifest.json",
            br#"{"resources":["a.prg","b.txt"],"start_prg":"a.prg"}"#,
        ),
        ("a.prg", &[0x01, 0x08]),
    ]);
    let writer = RecordingWriter::default();
    let (report, _) = boot_archive(zip, &writer).await;

    assert_eq!(writer.written_names(), vec!["a.prg"]);
    assert_eq!(report.args, vec!["-keymap", "en-us", "-prg", "a.prg", "-run"]);
    assert!(report.diagnostics.contains_kind("ResourceNotInArchive"));
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.to_string().contains("b.txt")));
}

#[tokio::test]
async fn test_resources_without_start_directive() {
    let zip = build_zip(&[
        ("manifest.json", br#"{"resources":["one.bin","two.bin","three.bin"]}"#),
        ("one.bin", b"1"),
        ("two.bin", b"2"),
        ("three.bin", b"3"),
    ]);
    let writer = RecordingWriter::default();
    let (report, _) = boot_archive(zip, &writer).await;

    assert_eq!(writer.writes.lock().len(), 3);
    assert_eq!(report.writes(), 3);
    assert_eq!(report.args.len(), 2);
}

#[tokio::test]
async fn test_archive_conflicting_start_directives() {
    let zip = build_zip(&[
        (
            "manifest.json",
            br#"{"resources":["HELLO.BAS","game.prg"],"start_bas":"HELLO.BAS","start_prg":"game.prg"}"#,
        ),
        ("HELLO.BAS", b"10 PRINT 1\r"),
        ("game.prg", &[0x01, 0x08]),
    ]);
    let writer = RecordingWriter::default();
    let (report, _) = boot_archive(zip, &writer).await;

    assert_eq!(report.args, vec!["-keymap", "en-us", "-bas", "HELLO.BAS", "-run"]);
    assert!(!report.args.iter().any(|a| a == "-prg"));
    assert!(report.diagnostics.contains_kind("ConflictingStartDirectives"));
}

#[tokio::test]
async fn test_archive_start_entry_with_directory_prefix() {
    let zip = build_zip(&[
        (
            "manifest.json",
            br#"{"resources":["HELLO.BAS"],"start_bas":"demo/HELLO.BAS"}"#,
        ),
        ("HELLO.BAS", b"10 PRINT 1\r"),
    ]);
    let writer = RecordingWriter::default();
    let (report, _) = boot_archive(zip, &writer).await;

    assert_eq!(writer.written_names(), vec!["HELLO.BAS"]);
    assert_eq!(
        report.args,
        vec!["-keymap", "en-us", "-bas", "demo/HELLO.BAS", "-run"]
    );
    assert!(report.diagnostics.is_empty());
}

#[tokio::test]
async fn test_archive_start_entry_not_in_resources() {
    let zip = build_zip(&[
        ("manifest.json", br#"{"resources":["b.txt"],"start_bas":"MISSING.BAS"}"#),
        ("b.txt", b"readme"),
        ("MISSING.BAS", b"10 END\r"),
    ]);
    let writer = RecordingWriter::default();
    let (report, _) = boot_archive(zip, &writer).await;

    assert_eq!(report.args, vec!["-keymap", "en-us"]);
    assert_eq!(report.start_mode, StartMode::None);
    assert_eq!(writer.written_names(), vec!["b.txt"]);
    assert!(report.diagnostics.contains_kind("StartEntryNotInResources"));
}

#[tokio::test]
async fn test_archive_without_descriptor() {
    let zip = build_zip(&[("a.prg", &[0x01, 0x08])]);
    let writer = RecordingWriter::default();
    let (report, _) = boot_archive(zip, &writer).await;

    assert!(writer.writes.lock().is_empty());
    assert_eq!(report.args, vec!["-keymap", "en-us"]);
    assert!(report.diagnostics.contains_kind("MissingDescriptor"));
}

#[tokio::test]
async fn test_archive_download_failure() {
    let writer = RecordingWriter::default();
    let location = ManifestLocation::parse(ARCHIVE_URL);
    let mut boot = Bootstrap::new(Keymap::default(), location, MockFetcher::default(), &writer);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await.unwrap();

    assert_eq!(report.args, vec!["-keymap", "en-us"]);
    assert!(report.diagnostics.contains_kind("ArchiveFetchError"));
    assert!(boot.gate().is_satisfied());
}

#[tokio::test]
async fn test_archive_resolution_is_idempotent() {
    let zip = build_zip(&[
        (
            "manifest.json",
            br#"{"resources":["a.prg","b.txt"],"start_prg":"a.prg"}"#,
        ),
        ("a.prg", &[0x01, 0x08]),
        ("b.txt", b"readme"),
    ]);

    let first_writer = RecordingWriter::default();
    let (first, _) = boot_archive(zip.clone(), &first_writer).await;
    let second_writer = RecordingWriter::default();
    let (second, _) = boot_archive(zip, &second_writer).await;

    let mut first_writes = first_writer.writes.lock().clone();
    let mut second_writes = second_writer.writes.lock().clone();
    first_writes.sort();
    second_writes.sort();
    assert_eq!(first_writes, second_writes);
    assert_eq!(first.args, second.args);
}

#[tokio::test]
async fn test_directory_registers_lazy_files() {
    let fetcher = MockFetcher::default().serve(
        "https://host/games/demo/manifest.json",
        br#"{"resources":["HELLO.BAS","assets/title.bin"],"start_bas":"HELLO.BAS"}"#.to_vec(),
    );
    let writer = RecordingWriter::default();
    let location = ManifestLocation::parse("https://host/games/demo");
    let mut boot = Bootstrap::new(Keymap::default(), location, fetcher, &writer);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await.unwrap();

    assert_eq!(report.args, vec!["-keymap", "en-us", "-bas", "HELLO.BAS", "-run"]);
    assert!(writer.writes.lock().is_empty());
    assert_eq!(
        *writer.lazy.lock(),
        vec![
            (
                "HELLO.BAS".to_string(),
                "https://host/games/demo/HELLO.BAS".to_string()
            ),
            (
                "title.bin".to_string(),
                "https://host/games/demo/assets/title.bin".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_directory_start_entry_with_directory_prefix() {
    let fetcher = MockFetcher::default().serve(
        "https://host/games/demo/manifest.json",
        br#"{"resources":["bin/game.prg"],"start_prg":"bin/game.prg"}"#.to_vec(),
    );
    let writer = RecordingWriter::default();
    let location = ManifestLocation::parse("https://host/games/demo/");
    let mut boot = Bootstrap::new(Keymap::default(), location, fetcher, &writer);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await.unwrap();

    assert_eq!(
        report.args,
        vec!["-keymap", "en-us", "-prg", "bin/game.prg", "-run"]
    );
    assert_eq!(
        *writer.lazy.lock(),
        vec![(
            "game.prg".to_string(),
            "https://host/games/demo/bin/game.prg".to_string()
        )]
    );
    assert!(report.diagnostics.is_empty());
}

#[tokio::test]
async fn test_directory_descriptor_not_found() {
    let writer = RecordingWriter::default();
    let location = ManifestLocation::parse("https://host/games/demo/");
    let mut boot = Bootstrap::new(Keymap::default(), location, MockFetcher::default(), &writer);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await.unwrap();

    assert!(writer.writes.lock().is_empty());
    assert!(writer.lazy.lock().is_empty());
    assert_eq!(report.args, vec!["-keymap", "en-us"]);
    assert!(report.diagnostics.contains_kind("DescriptorFetchError"));
    assert_eq!(report.state, BootState::Ready);
    assert_eq!(boot.gate().high_water_mark(), 1);
}

#[tokio::test]
async fn test_no_manifest_location() {
    let writer = RecordingWriter::default();
    let keymap = Keymap::from_name("de").unwrap();
    let mut boot = Bootstrap::new(keymap, None, MockFetcher::default(), &writer);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await.unwrap();

    assert_eq!(report.state, BootState::Idle);
    assert_eq!(boot.state(), BootState::Idle);
    assert_eq!(report.args, vec!["-keymap", "de"]);
    assert!(report.diagnostics.is_empty());
    assert!(!boot.gate().is_satisfied());
}

#[tokio::test]
async fn test_progress_messages() {
    let zip = build_zip(&[("manifest.json", br#"{"resources":[]}"#)]);
    let writer = RecordingWriter::default();
    let fetcher = MockFetcher::default().serve(ARCHIVE_URL, zip);
    let location = ManifestLocation::parse(ARCHIVE_URL);
    let mut boot = Bootstrap::new(Keymap::default(), location, fetcher, &writer)
        .with_progress(xb_integration::ProgressReporter::new(std::time::Duration::ZERO));
    boot.resolve().await;

    assert_eq!(
        boot.gate().progress().history(),
        &["Downloading file...", "Preparing... (0/1)", "All downloads complete."]
    );
}
