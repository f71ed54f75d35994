//! MMC command descriptions for reading EXT_CSD and switching the boot partition.
//!
//! These are plain values; submitting them to a card is the caller's job.

use crate::consts::{
    EXT_CSD_CMD_SET_NORMAL, EXT_CSD_LEN, EXT_CSD_PARTITION_CONFIG, MMC_SWITCH_MODE_WRITE_BYTE,
    flags, opcodes,
};
use crate::partition::BootPartition;
use crate::register::{ExtCsd, PartitionConfig};

/// `CMD8 SEND_EXT_CSD`: one 512-byte data block read from the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadExtCsdCommand;

impl ReadExtCsdCommand {
    /// Command opcode.
    pub const OPCODE: u32 = opcodes::MMC_SEND_EXT_CSD;
    /// Command argument.
    pub const ARG: u32 = 0;
    /// Response and command-class flags.
    pub const FLAGS: u32 = flags::MMC_RSP_SPI_R1 | flags::MMC_RSP_R1 | flags::MMC_CMD_ADTC;
    /// Data block size.
    pub const BLOCK_SIZE: u32 = EXT_CSD_LEN as u32;
    /// Number of data blocks.
    pub const BLOCKS: u32 = 1;
}

/// `CMD6 SWITCH` writing one byte of EXT_CSD.
///
/// Only the value byte is computed; mode, index and command set are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCommand {
    index: u8,
    value: u8,
}

impl SwitchCommand {
    /// Command opcode.
    pub const OPCODE: u32 = opcodes::MMC_SWITCH;
    /// Response and command-class flags: `R1b` so the host waits out card busy.
    pub const FLAGS: u32 = flags::MMC_RSP_SPI_R1B | flags::MMC_RSP_R1B | flags::MMC_CMD_AC;
    /// Access mode placed in bits 24–25 of the argument.
    pub const MODE: u32 = MMC_SWITCH_MODE_WRITE_BYTE;
    /// Command set placed in bits 0–2 of the argument.
    pub const CMD_SET: u32 = EXT_CSD_CMD_SET_NORMAL;

    /// Write `value` into `PARTITION_CONFIG`.
    pub const fn partition_config(value: PartitionConfig) -> Self {
        Self {
            index: EXT_CSD_PARTITION_CONFIG,
            value: value.raw(),
        }
    }

    /// EXT_CSD byte offset being written.
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Byte value being written.
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Packed `CMD6` argument: `mode << 24 | index << 16 | value << 8 | cmd_set`.
    pub const fn arg(&self) -> u32 {
        (Self::MODE << 24) | ((self.index as u32) << 16) | ((self.value as u32) << 8) | Self::CMD_SET
    }
}

/// Build the `CMD6` that makes `target` the boot partition.
///
/// Read-modify-write on the `PARTITION_CONFIG` byte of `ext_csd`: bits 3–5
/// are replaced by the enable value of `target`, every other bit is copied
/// from the snapshot.
pub fn encode_switch_command(ext_csd: &ExtCsd, target: BootPartition) -> SwitchCommand {
    let next = ext_csd
        .partition_config()
        .with_boot_partition_enable(target.boot_partition_enable());
    SwitchCommand::partition_config(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(partition_config: u8) -> ExtCsd {
        ExtCsd::zeroed().with_partition_config(PartitionConfig::from_raw(partition_config))
    }

    #[test]
    fn test_switch_to_boot1_from_boot0() {
        let cmd = encode_switch_command(&snapshot(0b0000_1000), BootPartition::Boot1);
        assert_eq!(cmd.index(), 179);
        assert_eq!(cmd.value(), 0b0001_0000);
    }

    #[test]
    fn test_switch_to_boot0_from_unconfigured() {
        let cmd = encode_switch_command(&snapshot(0), BootPartition::Boot0);
        assert_eq!(cmd.value(), 0b0000_1000);
    }

    #[test]
    fn test_switch_preserves_boot_ack_and_access_bits() {
        let cmd = encode_switch_command(&snapshot(0b0100_1001), BootPartition::Boot1);
        assert_eq!(cmd.value(), 0b0101_0001);

        let cmd = encode_switch_command(&snapshot(0b1111_1111), BootPartition::Boot0);
        assert_eq!(cmd.value(), 0b1100_1111);
    }

    #[test]
    fn test_switch_arg_packing() {
        let cmd = SwitchCommand::partition_config(PartitionConfig::from_raw(0x10));
        assert_eq!(cmd.arg(), 0x03B3_1001);
    }

    #[test]
    fn test_protocol_constants() {
        assert_eq!(SwitchCommand::OPCODE, 6);
        assert_eq!(SwitchCommand::FLAGS, 0x049D);
        assert_eq!(ReadExtCsdCommand::OPCODE, 8);
        assert_eq!(ReadExtCsdCommand::FLAGS, 0x00B5);
        assert_eq!(ReadExtCsdCommand::BLOCK_SIZE, 512);
        assert_eq!(ReadExtCsdCommand::BLOCKS, 1);
    }
}
