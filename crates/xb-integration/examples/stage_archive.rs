//! Example resolving an in-memory archive and printing the emulator arguments
//!
//! This example shows how to:
//! 1. Build a manifest archive
//! 2. Resolve it into an emulated filesystem
//! 3. Collect the arguments the emulator would be started with

use std::io::{Cursor, Write};
use xb_core::{FetchError, Keymap};
use xb_integration::{Bootstrap, DryRunLauncher};
use xb_loader::ManifestLocation;
use xb_vfs::{EmulatedFs, FetchResponse, Fetcher};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Serves one archive for any URL
struct StaticArchive(Vec<u8>);

impl Fetcher for StaticArchive {
    async fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
        Ok(FetchResponse::ok(self.0.clone()))
    }
}

fn build_archive() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("manifest.json", FileOptions::default())?;
    zip.write_all(br#"{"resources":["HELLO.BAS","sprites.bin"],"start_bas":"HELLO.BAS"}"#)?;
    zip.start_file("HELLO.BAS", FileOptions::default())?;
    zip.write_all(b"10 PRINT \"HELLO\"\r20 GOTO 10\r")?;
    zip.start_file("sprites.bin", FileOptions::default())?;
    zip.write_all(&[0u8; 64])?;
    Ok(zip.finish()?.into_inner())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let fetcher = StaticArchive(build_archive()?);
    let fs = EmulatedFs::new();
    let location = ManifestLocation::parse("https://example.com/hello.zip");

    let mut boot = Bootstrap::new(Keymap::default(), location, fetcher, &fs);
    let mut launcher = DryRunLauncher::new();
    let report = boot.run(&mut launcher).await?;

    println!("Files: {:?}", fs.list());
    println!("Arguments: {}", report.args.join(" "));
    for diagnostic in &report.diagnostics {
        println!("[error] {}", diagnostic);
    }
    Ok(())
}
