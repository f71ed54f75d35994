//! Error types for boot partition updates

use std::io;
use std::path::PathBuf;

use emmc_ext_csd::BootPartition;
use thiserror::Error;

use crate::updater::UpdatePhase;

/// Errors that abort an update run.
///
/// Every variant is terminal; nothing is retried internally. The message is
/// a single line naming the failed step and the underlying system error.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The whole-device node could not be opened
    #[error("Could not open block device {}: {source}", path.display())]
    DeviceOpen {
        /// Device node path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// `SEND_EXT_CSD` failed
    #[error("Could not read extended CSD: {source}")]
    RegisterRead {
        /// Underlying error
        source: io::Error,
    },

    /// `force_ro` could not be cleared
    #[error("Could not disable read only on boot part {}: {source}", partition.index())]
    WriteProtection {
        /// Target partition
        partition: BootPartition,
        /// `force_ro` control path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The firmware image could not be opened
    #[error("Could not open firmware file {}: {source}", path.display())]
    ImageOpen {
        /// Image path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The firmware image size could not be determined
    #[error("Could not get firmware stat for {}: {source}", path.display())]
    ImageStat {
        /// Image path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The boot partition node could not be opened or written
    #[error("Could not write firmware to boot part {} ({}): {source}", partition.index(), path.display())]
    ImageWrite {
        /// Target partition
        partition: BootPartition,
        /// Boot partition node path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The `PARTITION_CONFIG` switch was rejected
    #[error(
        "Could not change selected boot part to {}: {source}; the new firmware is written but not selected, rerun to retry",
        partition.index()
    )]
    BootSelect {
        /// Partition that should have been selected
        partition: BootPartition,
        /// Underlying error
        source: io::Error,
    },
}

/// How bad a failure is for the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Device unchanged; the old firmware still boots
    Error,
    /// New firmware written but not selected; operator action needed
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl UpdateError {
    /// Step of the update sequence that failed.
    pub fn phase(&self) -> UpdatePhase {
        match self {
            UpdateError::DeviceOpen { .. } => UpdatePhase::OpenDevice,
            UpdateError::RegisterRead { .. } => UpdatePhase::ReadRegister,
            UpdateError::WriteProtection { .. } => UpdatePhase::UnlockTarget,
            UpdateError::ImageOpen { .. }
            | UpdateError::ImageStat { .. }
            | UpdateError::ImageWrite { .. } => UpdatePhase::WriteImage,
            UpdateError::BootSelect { .. } => UpdatePhase::SwitchBoot,
        }
    }

    /// The underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            UpdateError::DeviceOpen { source, .. }
            | UpdateError::RegisterRead { source }
            | UpdateError::WriteProtection { source, .. }
            | UpdateError::ImageOpen { source, .. }
            | UpdateError::ImageStat { source, .. }
            | UpdateError::ImageWrite { source, .. }
            | UpdateError::BootSelect { source, .. } => source,
        }
    }

    /// OS error code of the underlying failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().raw_os_error()
    }

    /// Severity of the failure for the device.
    pub fn severity(&self) -> Severity {
        match self {
            UpdateError::BootSelect { .. } => Severity::Critical,
            _ => Severity::Error,
        }
    }

    /// Whether the new image reached the target partition.
    ///
    /// Only true for a failed switch: the inactive partition holds the new
    /// firmware while the device keeps booting the old one.
    pub fn image_written(&self) -> bool {
        matches!(self, UpdateError::BootSelect { .. })
    }
}
