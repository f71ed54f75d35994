//! The two hardware boot partitions and active-partition decoding.

use serde::{Deserialize, Serialize};

use crate::consts::partition_config::{ENABLE_BOOT1, ENABLE_BOOT2};
use crate::register::ExtCsd;

/// One of the two eMMC hardware boot partitions.
///
/// The index matches the Linux block node suffix: `Boot0` is `mmcblkXboot0`,
/// which JEDEC calls "boot partition 1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BootPartition {
    /// `mmcblkXboot0`
    Boot0,
    /// `mmcblkXboot1`
    Boot1,
}

/// Returned when an index other than 0 or 1 is converted to a [`BootPartition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("boot partition index must be 0 or 1, got {0}")]
pub struct InvalidBootPartition(pub u8);

impl BootPartition {
    /// Both partitions, in index order.
    pub const ALL: [BootPartition; 2] = [BootPartition::Boot0, BootPartition::Boot1];

    /// Block node suffix index (0 or 1).
    pub const fn index(self) -> u8 {
        match self {
            BootPartition::Boot0 => 0,
            BootPartition::Boot1 => 1,
        }
    }

    /// The other partition.
    pub const fn other(self) -> Self {
        match self {
            BootPartition::Boot0 => BootPartition::Boot1,
            BootPartition::Boot1 => BootPartition::Boot0,
        }
    }

    /// `BOOT_PARTITION_ENABLE` value that selects this partition.
    pub const fn boot_partition_enable(self) -> u8 {
        match self {
            BootPartition::Boot0 => ENABLE_BOOT1,
            BootPartition::Boot1 => ENABLE_BOOT2,
        }
    }
}

impl std::fmt::Display for BootPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boot{}", self.index())
    }
}

impl From<BootPartition> for u8 {
    fn from(partition: BootPartition) -> Self {
        partition.index()
    }
}

impl TryFrom<u8> for BootPartition {
    type Error = InvalidBootPartition;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(BootPartition::Boot0),
            1 => Ok(BootPartition::Boot1),
            other => Err(InvalidBootPartition(other)),
        }
    }
}

/// Decode which boot partition the boot ROM currently reads.
///
/// Only `BOOT_PARTITION_ENABLE == 1` is recognised explicitly and maps to
/// [`BootPartition::Boot0`]. Every other value, including `0` on a device
/// that was never configured, falls back to [`BootPartition::Boot1`], so the
/// first update of a fresh device lands in `boot0`. Keep this asymmetry: it
/// decides which partition is considered safe to overwrite.
pub fn decode_active_partition(ext_csd: &ExtCsd) -> BootPartition {
    match ext_csd.partition_config().boot_partition_enable() {
        ENABLE_BOOT1 => BootPartition::Boot0,
        _ => BootPartition::Boot1,
    }
}
