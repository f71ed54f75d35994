//! Where the device nodes and controls of one eMMC device live.

use std::path::PathBuf;

use emmc_ext_csd::BootPartition;
use serde::{Deserialize, Serialize};

/// Default eMMC device name.
pub const DEFAULT_DEVICE: &str = "mmcblk0";
/// Default directory holding block device nodes.
pub const DEFAULT_DEV_DIR: &str = "/dev";
/// Default sysfs block class directory.
pub const DEFAULT_SYSFS_BLOCK_DIR: &str = "/sys/class/block";

const FORCE_RO: &str = "force_ro";

/// Naming of the whole-device node, the boot partition nodes and their
/// `force_ro` controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLayout {
    /// Device name, e.g. `mmcblk0`
    pub device: String,
    /// Directory holding the block device nodes
    pub dev_dir: PathBuf,
    /// sysfs block class directory
    pub sysfs_block_dir: PathBuf,
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            dev_dir: PathBuf::from(DEFAULT_DEV_DIR),
            sysfs_block_dir: PathBuf::from(DEFAULT_SYSFS_BLOCK_DIR),
        }
    }
}

impl DeviceLayout {
    /// Layout for `device` under the default directories.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    /// Whole-device node, e.g. `/dev/mmcblk0`.
    pub fn device_node(&self) -> PathBuf {
        self.dev_dir.join(&self.device)
    }

    /// Block name of a boot partition, e.g. `mmcblk0boot1`.
    pub fn boot_partition_name(&self, partition: BootPartition) -> String {
        format!("{}boot{}", self.device, partition.index())
    }

    /// Boot partition node, e.g. `/dev/mmcblk0boot1`.
    pub fn boot_partition_node(&self, partition: BootPartition) -> PathBuf {
        self.dev_dir.join(self.boot_partition_name(partition))
    }

    /// `force_ro` control, e.g. `/sys/class/block/mmcblk0boot1/force_ro`.
    pub fn force_ro_path(&self, partition: BootPartition) -> PathBuf {
        self.sysfs_block_dir
            .join(self.boot_partition_name(partition))
            .join(FORCE_RO)
    }
}
