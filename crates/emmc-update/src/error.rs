//! Error types and exit codes for emmc-update

use emmc_boot_update::UpdateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Unsupported platform: {0} has no MMC ioctl interface")]
    UnsupportedPlatform(&'static str),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Fail early on platforms without the MMC block ioctl.
pub fn ensure_supported() -> Result<(), CliError> {
    if cfg!(target_os = "linux") {
        Ok(())
    } else {
        Err(CliError::UnsupportedPlatform(std::env::consts::OS))
    }
}

/// Process exit status for a failed run.
///
/// The OS error code of the failed step, clamped to `1..=255`, otherwise 1.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let errno = match error.downcast_ref::<UpdateError>() {
        Some(update) => update.raw_os_error(),
        None => error
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::raw_os_error),
    };
    errno
        .map(|code| code.clamp(1, 255))
        .and_then(|code| u8::try_from(code).ok())
        .unwrap_or(1)
}

/// Short machine-readable name for the error kind.
pub fn error_type_name(error: &anyhow::Error) -> &'static str {
    if let Some(update) = error.downcast_ref::<UpdateError>() {
        return match update {
            UpdateError::DeviceOpen { .. } => "device_open",
            UpdateError::RegisterRead { .. } => "register_read",
            UpdateError::WriteProtection { .. } => "write_protection",
            UpdateError::ImageOpen { .. } => "image_open",
            UpdateError::ImageStat { .. } => "image_stat",
            UpdateError::ImageWrite { .. } => "image_write",
            UpdateError::BootSelect { .. } => "boot_select",
        };
    }
    match error.downcast_ref::<CliError>() {
        Some(CliError::UnsupportedPlatform(_)) => "unsupported_platform",
        Some(CliError::JsonError(_)) => "json",
        None => "other",
    }
}
