mod cli;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use relinstall::{InstallError, Installer, shim};

fn main() {
    let args = cli::Args::parse();

    // Single-line output for package manager logs
    env_logger::Builder::new()
        .format(|buf, record| {
            use std::io::Write;
            match record.level() {
                log::Level::Info => writeln!(buf, "[relinstall] {}", record.args()),
                level => writeln!(buf, "[relinstall] {}: {}", level, record.args()),
            }
        })
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[relinstall] FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    let code = rt.block_on(real_main(args));
    std::process::exit(code);
}

async fn real_main(args: cli::Args) -> i32 {
    match args.sub {
        cli::Cmd::Install {
            package_root,
            dry_run,
        } => {
            let root = match install_root(package_root) {
                Ok(root) => root,
                Err(e) => {
                    error!("prepare: {e:#}");
                    return 1;
                }
            };
            match run_install(&root, dry_run).await {
                Ok(()) => 0,
                Err(e) => {
                    error!("{}", e.diagnostic());
                    1
                }
            }
        }
        cli::Cmd::Exec { package_root, args } => match run_exec(package_root, &args).await {
            Ok(code) => code,
            Err(e) => {
                error!("{e:#}");
                1
            }
        },
    }
}

async fn run_install(package_root: &Path, dry_run: bool) -> Result<(), InstallError> {
    info!("Starting install in {}", package_root.display());
    let installer = Installer::for_package_root(package_root)?;

    if dry_run {
        let plan = installer.plan()?;
        info!("Platform: {}", plan.platform);
        info!("Asset: {} ({})", plan.asset.file_name, plan.asset.archive_kind);
        info!("URL: {}", plan.url);
        info!("Destination: {}", plan.destination().display());
        return Ok(());
    }

    let artifact = installer.install().await?;
    info!(
        "Install completed successfully: {}{}",
        artifact.path.display(),
        if artifact.executable_bit { " (0755)" } else { "" }
    );
    Ok(())
}

async fn run_exec(package_root: Option<PathBuf>, args: &[OsString]) -> Result<i32> {
    let root = match package_root {
        Some(root) => root,
        None => exe_dir()?,
    };
    let code = shim::run(&root, args).await?;
    Ok(code)
}

/// Lifecycle scripts run with the package root as working directory
fn install_root(package_root: Option<PathBuf>) -> Result<PathBuf> {
    match package_root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

/// Directory holding this executable, which sits at the package root
fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable {} has no parent directory", exe.display()))
}
