//! A/B bootloader updates for eMMC hardware boot partitions.
//!
//! The bootloader lives in one of the two eMMC boot partitions (`boot0`,
//! `boot1`). The boot ROM reads whichever one `PARTITION_CONFIG` selects. An
//! update never touches the selected partition:
//!
//! 1. read EXT_CSD and decode the active partition
//! 2. pick the other partition as the target
//! 3. clear its `force_ro` protection
//! 4. write the complete image into it
//! 5. rewrite `PARTITION_CONFIG` so the next boot reads the target
//!
//! If anything fails before step 5 the device still boots the old image and
//! the whole run can simply be repeated. A failure in step 5 leaves the new
//! image written but unselected; rerunning targets the same partition again.
//!
//! # Architecture
//!
//! - [`channel`]: the privileged MMC command capability
//! - [`linux`]: `MMC_IOC_CMD` and `sendfile(2)` backends (Linux only)
//! - [`access`]: `force_ro` handling
//! - [`writer`]: full-length image transfer
//! - [`selector`]: boot partition switch
//! - [`updater`]: the update sequence
//! - [`layout`]: device node naming
//! - [`error`]: error types
//!
//! # Example
//!
//! ```ignore
//! use emmc_boot_update::prelude::*;
//!
//! let mut updater = BootUpdater::open(DeviceLayout::default())?;
//! let report = updater.run("bootloader.img".as_ref())?;
//! println!("Selected boot partition {} for the next boot", report.selected.index());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod access;
pub mod channel;
pub mod error;
pub mod layout;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod prelude;
pub mod selector;
pub mod updater;
pub mod writer;

pub use access::clear_write_protection;
pub use channel::MmcCommandChannel;
pub use error::{Severity, UpdateError};
pub use layout::DeviceLayout;
#[cfg(target_os = "linux")]
pub use linux::{LinuxMmcDevice, SendfileTransfer};
pub use selector::select_boot_partition;
pub use updater::{BootUpdater, UpdatePhase, UpdatePlan, UpdateReport};
pub use writer::{ImageTransfer, StreamTransfer, transfer_all, write_image};

pub use emmc_ext_csd::{BootPartition, ExtCsd, PartitionConfig, SwitchCommand};
