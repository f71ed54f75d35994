//! eMMC EXT_CSD boot-partition register view and MMC command encoding.
//!
//! This crate is I/O-free. It knows where the boot-partition selection lives
//! inside the 512-byte extended CSD register and how to build the two MMC
//! commands an A/B boot update needs:
//!
//! - `CMD8 SEND_EXT_CSD` to read the register snapshot
//! - `CMD6 SWITCH` (write-byte mode) to rewrite `PARTITION_CONFIG`
//!
//! ## PARTITION_CONFIG (EXT_CSD byte 179)
//!
//! | bits | field                   |
//! |------|-------------------------|
//! | 7    | reserved                |
//! | 6    | `BOOT_ACK`              |
//! | 5–3  | `BOOT_PARTITION_ENABLE` |
//! | 2–0  | `PARTITION_ACCESS`      |
//!
//! `BOOT_PARTITION_ENABLE` values per JEDEC JESD84: `0` not enabled,
//! `1` boot partition 1 (`mmcblkXboot0`), `2` boot partition 2
//! (`mmcblkXboot1`), `7` user area, everything else reserved.
//!
//! Switching only ever rewrites bits 3–5; every other bit of the previous
//! snapshot is carried over unchanged.

#![deny(static_mut_refs)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod command;
pub mod consts;
pub mod partition;
pub mod register;

pub use command::{ReadExtCsdCommand, SwitchCommand, encode_switch_command};
pub use consts::{EXT_CSD_LEN, EXT_CSD_PARTITION_CONFIG};
pub use partition::{BootPartition, InvalidBootPartition, decode_active_partition};
pub use register::{ExtCsd, InvalidExtCsdLength, PartitionConfig};
