//! x16-boot - manifest bootstrapper for the Commander X16 emulator
//!
//! Main entry point: resolves a manifest location, stages its resources
//! and starts the emulator with the matching arguments.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use xb_core::{logging, Config, Keymap};
use xb_integration::{
    BootContext, Bootstrap, DryRunLauncher, InitStep, ProcessLauncher, ProgressReporter,
};
use xb_loader::ManifestLocation;
use xb_vfs::{DefaultFetcher, EmulatedFs};

#[derive(Parser, Debug)]
#[command(name = "x16-boot", version, about)]
struct Cli {
    /// Manifest location: a directory URL/path or a `.zip` archive
    #[arg(long)]
    manifest: Option<String>,

    /// Page URL carrying the location in its `manifest` query parameter
    #[arg(long, conflicts_with = "manifest")]
    page_url: Option<String>,

    /// Keyboard layout, overrides the config file and locale
    #[arg(long)]
    keymap: Option<String>,

    /// Emulator binary, overrides the config file
    #[arg(long)]
    emulator: Option<PathBuf>,

    /// Directory the resources are staged into, overrides the config file
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Resolve and print the emulator arguments without starting it
    #[arg(long)]
    dry_run: bool,
}

/// Show the collected diagnostics the way the on-screen log does
fn print_diagnostics(ctx: &mut BootContext) -> xb_core::Result<()> {
    if !ctx.diagnostics.is_empty() {
        eprint!("{}", ctx.diagnostics);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e.to_string())),
    };
    logging::init(config.general.log_level);
    if let Some(e) = config_error {
        tracing::warn!("Failed to load config from {:?}: {}", Config::config_path(), e);
    }

    tracing::info!("Starting x16-boot");

    let keymap = Keymap::detect(cli.keymap.as_deref().or(config.general.keymap.as_deref()));
    let location = match (&cli.manifest, &cli.page_url) {
        (Some(manifest), _) => ManifestLocation::parse(manifest),
        (None, Some(page)) => ManifestLocation::from_page_url(page),
        (None, None) => None,
    };
    if let Some(location) = &location {
        tracing::info!("Manifest location: {}", location);
    }

    let fetcher = DefaultFetcher::new(
        Duration::from_secs(config.network.timeout_secs),
        &config.network.user_agent,
    )
    .context("failed to create HTTP client")?;
    let fs = Arc::new(EmulatedFs::new());

    let mut boot = Bootstrap::new(keymap, location, fetcher.clone(), Arc::clone(&fs))
        .with_progress(ProgressReporter::new(Duration::from_millis(
            config.progress.throttle_ms,
        )))
        .with_post_run(InitStep::new("print_diagnostics", print_diagnostics));

    if cli.dry_run {
        let mut launcher = DryRunLauncher::new();
        let report = boot.run(&mut launcher).await?;
        for name in fs.list() {
            println!("file: {}", name);
        }
        println!("{}", report.args.join(" "));
        return Ok(());
    }

    let binary = cli.emulator.unwrap_or(config.emulator.binary);
    let staging_dir = cli.staging_dir.unwrap_or(config.emulator.staging_dir);
    let mut launcher = ProcessLauncher::new(binary, staging_dir, fs, fetcher)
        .with_extra_args(config.emulator.extra_args);

    boot.run(&mut launcher).await?;
    let status = launcher.wait().await?;
    tracing::info!("Emulator exited with {}", status);

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
