//! emmc-update - A/B bootloader installer for eMMC boot partitions
//!
//! Writes a firmware image into the boot partition the device is *not*
//! booting from, then switches `PARTITION_CONFIG` so the next power-on boots
//! the new image.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use emmc_boot_update::DeviceLayout;
use emmc_boot_update::layout::{DEFAULT_DEV_DIR, DEFAULT_DEVICE, DEFAULT_SYSFS_BLOCK_DIR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "emmc-update")]
#[command(about = "Install a bootloader image into the inactive eMMC boot partition")]
#[command(version)]
#[command(long_about = "
emmc-update reads the eMMC EXT_CSD register to find the boot partition the
device currently boots from, writes the firmware image into the other one and
selects it for the next boot.

The active partition is never written. If the run fails before the final
switch, the device keeps booting the previous firmware and the command can be
repeated.
")]
struct Cli {
    /// Firmware image to install
    image: PathBuf,

    /// eMMC device name
    #[arg(long, env = "EMMC_UPDATE_DEVICE", default_value = DEFAULT_DEVICE)]
    device: String,

    /// Directory holding the block device nodes
    #[arg(long, env = "EMMC_UPDATE_DEV_DIR", default_value = DEFAULT_DEV_DIR)]
    dev_dir: PathBuf,

    /// sysfs block class directory holding the force_ro controls
    #[arg(long = "sysfs-dir", env = "EMMC_UPDATE_SYSFS_DIR", default_value = DEFAULT_SYSFS_BLOCK_DIR)]
    sysfs_dir: PathBuf,

    /// Read the register and report the target without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Output format (human-readable or JSON)
    #[arg(long, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn layout(&self) -> DeviceLayout {
        DeviceLayout {
            device: self.device.clone(),
            dev_dir: self.dev_dir.clone(),
            sysfs_block_dir: self.sysfs_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("emmc_update={log_level},emmc_boot_update={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(error::exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    error::ensure_supported()?;
    update(cli)
}

#[cfg(target_os = "linux")]
fn update(cli: &Cli) -> Result<()> {
    use emmc_boot_update::BootUpdater;

    let layout = cli.layout();
    tracing::debug!(?layout, image = %cli.image.display(), "Starting update");

    let mut updater = BootUpdater::open(layout)?;
    let plan = updater.plan()?;
    if cli.dry_run {
        output::print_plan(&plan, cli.json)?;
        return Ok(());
    }

    output::print_installing(&plan, cli.json);
    let report = updater.apply(&plan, &cli.image)?;
    output::print_report(&report, cli.json)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn update(_cli: &Cli) -> Result<()> {
    Err(error::CliError::UnsupportedPlatform(std::env::consts::OS).into())
}
