//! Convenience re-exports for common boot update types

pub use crate::access::clear_write_protection;
pub use crate::channel::MmcCommandChannel;
pub use crate::error::{Severity, UpdateError};
pub use crate::layout::DeviceLayout;
#[cfg(target_os = "linux")]
pub use crate::linux::{LinuxMmcDevice, SendfileTransfer};
pub use crate::selector::select_boot_partition;
pub use crate::updater::{BootUpdater, UpdatePhase, UpdatePlan, UpdateReport};
pub use crate::writer::{ImageTransfer, StreamTransfer, transfer_all, write_image};

pub use emmc_ext_csd::{
    BootPartition, ExtCsd, PartitionConfig, SwitchCommand, decode_active_partition,
    encode_switch_command,
};
