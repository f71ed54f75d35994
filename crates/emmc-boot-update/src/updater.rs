//! The A/B boot update sequence.
//!
//! ```text
//! OpenDevice -> ReadRegister -> SelectTarget -> UnlockTarget -> WriteImage -> SwitchBoot -> Done
//! ```
//!
//! Linear, blocking, no automatic retries. Any failure ends the run with the
//! step that failed attached to the error.

use std::path::{Path, PathBuf};

use emmc_ext_csd::{BootPartition, ExtCsd, PartitionConfig, decode_active_partition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::clear_write_protection;
use crate::channel::MmcCommandChannel;
use crate::error::UpdateError;
use crate::layout::DeviceLayout;
use crate::selector::select_boot_partition;
use crate::writer::write_image;

/// Steps of the update sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdatePhase {
    /// Opening the whole-device node
    OpenDevice,
    /// Reading EXT_CSD
    ReadRegister,
    /// Deriving the inactive partition
    SelectTarget,
    /// Clearing `force_ro` on the target
    UnlockTarget,
    /// Writing the firmware image
    WriteImage,
    /// Switching `PARTITION_CONFIG` to the target
    SwitchBoot,
    /// Sequence finished
    Done,
}

impl std::fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UpdatePhase::OpenDevice => "open device",
            UpdatePhase::ReadRegister => "read register",
            UpdatePhase::SelectTarget => "select target",
            UpdatePhase::UnlockTarget => "unlock target",
            UpdatePhase::WriteImage => "write image",
            UpdatePhase::SwitchBoot => "switch boot partition",
            UpdatePhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Target chosen from one EXT_CSD snapshot.
///
/// The snapshot is kept so the switch command is built from exactly the
/// register state the target was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePlan {
    #[serde(skip)]
    ext_csd: ExtCsd,
    /// Partition the device boots from now
    pub active: BootPartition,
    /// Partition that will receive the image
    pub target: BootPartition,
    /// Block node of the target partition
    pub target_node: PathBuf,
    /// `PARTITION_CONFIG` at read time
    pub partition_config: PartitionConfig,
}

impl UpdatePlan {
    /// EXT_CSD snapshot the plan was derived from.
    pub fn ext_csd(&self) -> &ExtCsd {
        &self.ext_csd
    }
}

/// Outcome of a successful update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Partition booted before the update
    pub previous: BootPartition,
    /// Partition selected for the next boot
    pub selected: BootPartition,
    /// Block node the image was written to
    pub partition_node: PathBuf,
    /// Image bytes written
    pub bytes_written: u64,
    /// `PARTITION_CONFIG` before the switch
    pub partition_config_before: PartitionConfig,
    /// `PARTITION_CONFIG` written by the switch
    pub partition_config_after: PartitionConfig,
}

/// Runs the update sequence against one eMMC device.
#[derive(Debug)]
pub struct BootUpdater<C> {
    channel: C,
    layout: DeviceLayout,
}

#[cfg(target_os = "linux")]
impl BootUpdater<crate::linux::LinuxMmcDevice> {
    /// Open the whole-device node named by `layout`.
    pub fn open(layout: DeviceLayout) -> Result<Self, UpdateError> {
        let path = layout.device_node();
        info!(phase = %UpdatePhase::OpenDevice, device = %path.display(), "Opening block device");
        let device = crate::linux::LinuxMmcDevice::open(&path)
            .map_err(|source| UpdateError::DeviceOpen { path, source })?;
        Ok(Self::new(device, layout))
    }
}

impl<C: MmcCommandChannel> BootUpdater<C> {
    /// Updater over an already open command channel.
    pub fn new(channel: C, layout: DeviceLayout) -> Self {
        Self { channel, layout }
    }

    /// Device layout in use.
    pub fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    /// Release the command channel.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Read EXT_CSD and choose the partition to write.
    ///
    /// Nothing on the device is modified.
    pub fn plan(&mut self) -> Result<UpdatePlan, UpdateError> {
        info!(phase = %UpdatePhase::ReadRegister, "Reading extended CSD");
        let ext_csd = self
            .channel
            .read_register()
            .map_err(|source| UpdateError::RegisterRead { source })?;
        let partition_config = ext_csd.partition_config();
        debug!(partition_config = %partition_config, "Current PARTITION_CONFIG");

        let active = decode_active_partition(&ext_csd);
        let target = active.other();
        let target_node = self.layout.boot_partition_node(target);
        info!(
            phase = %UpdatePhase::SelectTarget,
            active = %active,
            target = %target,
            "Selected inactive boot partition"
        );

        Ok(UpdatePlan {
            ext_csd,
            active,
            target,
            target_node,
            partition_config,
        })
    }

    /// Unlock, write and select the target of `plan`.
    pub fn apply(&mut self, plan: &UpdatePlan, image: &Path) -> Result<UpdateReport, UpdateError> {
        let target = plan.target;

        info!(phase = %UpdatePhase::UnlockTarget, partition = %target, "Clearing write protection");
        clear_write_protection(&self.layout, target)?;

        info!(phase = %UpdatePhase::WriteImage, "Installing new firmware on {}", plan.target_node.display());
        let bytes_written = write_image(&self.layout, image, target)?;

        info!(phase = %UpdatePhase::SwitchBoot, partition = %target, "Switching boot partition");
        let command = select_boot_partition(&mut self.channel, &plan.ext_csd, target)?;

        info!(
            phase = %UpdatePhase::Done,
            "Selected boot partition {} for the next boot",
            target.index()
        );

        Ok(UpdateReport {
            previous: plan.active,
            selected: target,
            partition_node: plan.target_node.clone(),
            bytes_written,
            partition_config_before: plan.partition_config,
            partition_config_after: PartitionConfig::from_raw(command.value()),
        })
    }

    /// Full sequence: [`plan`](Self::plan) then [`apply`](Self::apply).
    pub fn run(&mut self, image: &Path) -> Result<UpdateReport, UpdateError> {
        let plan = self.plan()?;
        self.apply(&plan, image)
    }
}
