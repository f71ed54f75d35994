//! Simulated eMMC card and temp-dir device layout shared by the test suites.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use emmc_boot_update::prelude::*;
use tempfile::TempDir;

/// In-memory card answering `CMD8`/`CMD6` like real hardware.
#[derive(Debug, Default)]
pub struct SimulatedMmc {
    pub ext_csd: ExtCsd,
    pub reads: usize,
    pub switches: Vec<SwitchCommand>,
    pub fail_read: Option<i32>,
    pub fail_switch: Option<i32>,
}

impl SimulatedMmc {
    pub fn with_partition_config(raw: u8) -> Self {
        Self {
            ext_csd: ExtCsd::zeroed().with_partition_config(PartitionConfig::from_raw(raw)),
            ..Self::default()
        }
    }

    pub fn partition_config(&self) -> PartitionConfig {
        self.ext_csd.partition_config()
    }
}

impl MmcCommandChannel for SimulatedMmc {
    fn read_register(&mut self) -> io::Result<ExtCsd> {
        self.reads += 1;
        match self.fail_read {
            Some(errno) => Err(io::Error::from_raw_os_error(errno)),
            None => Ok(self.ext_csd.clone()),
        }
    }

    fn write_register_byte(&mut self, command: &SwitchCommand) -> io::Result<()> {
        if let Some(errno) = self.fail_switch {
            return Err(io::Error::from_raw_os_error(errno));
        }
        if command.index() != 179 {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }
        self.ext_csd = self
            .ext_csd
            .with_partition_config(PartitionConfig::from_raw(command.value()));
        self.switches.push(*command);
        Ok(())
    }
}

/// Boot partition nodes and `force_ro` controls backed by plain files.
pub struct TempDevice {
    pub dir: TempDir,
    pub layout: DeviceLayout,
}

pub const OLD_BOOT0: &[u8] = b"old firmware in boot0";
pub const OLD_BOOT1: &[u8] = b"old firmware in boot1";

impl TempDevice {
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let layout = DeviceLayout {
            device: "mmcblk0".to_string(),
            dev_dir: dir.path().join("dev"),
            sysfs_block_dir: dir.path().join("sys/class/block"),
        };
        fs::create_dir_all(&layout.dev_dir)?;
        fs::write(layout.boot_partition_node(BootPartition::Boot0), OLD_BOOT0)?;
        fs::write(layout.boot_partition_node(BootPartition::Boot1), OLD_BOOT1)?;
        for partition in BootPartition::ALL {
            let control = layout.force_ro_path(partition);
            if let Some(parent) = control.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(control, "1")?;
        }
        Ok(Self { dir, layout })
    }

    pub fn write_image(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn partition_contents(&self, partition: BootPartition) -> io::Result<Vec<u8>> {
        fs::read(self.layout.boot_partition_node(partition))
    }

    pub fn force_ro(&self, partition: BootPartition) -> io::Result<String> {
        fs::read_to_string(self.layout.force_ro_path(partition))
    }

    pub fn remove_force_ro(&self, partition: BootPartition) -> io::Result<()> {
        fs::remove_file(self.layout.force_ro_path(partition))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
