//! MMC protocol constants used by the boot-partition update.
//!
//! Values mirror `include/linux/mmc/mmc.h` and `include/linux/mmc/core.h`.

/// Size of the extended CSD register in bytes.
pub const EXT_CSD_LEN: usize = 512;

/// EXT_CSD byte offset of `PARTITION_CONFIG`.
pub const EXT_CSD_PARTITION_CONFIG: u8 = 179;

/// MMC command opcodes.
pub mod opcodes {
    /// `CMD6`: switch a byte of EXT_CSD.
    pub const MMC_SWITCH: u32 = 6;
    /// `CMD8`: read the full EXT_CSD register.
    pub const MMC_SEND_EXT_CSD: u32 = 8;
}

/// `CMD6` access mode: write the value byte.
pub const MMC_SWITCH_MODE_WRITE_BYTE: u32 = 0x03;

/// `CMD6` command set: normal.
pub const EXT_CSD_CMD_SET_NORMAL: u32 = 1 << 0;

/// Response and command-class flags carried in `mmc_ioc_cmd.flags`.
pub mod flags {
    /// Response present.
    pub const MMC_RSP_PRESENT: u32 = 1 << 0;
    /// Response carries a valid CRC.
    pub const MMC_RSP_CRC: u32 = 1 << 2;
    /// Card may send busy.
    pub const MMC_RSP_BUSY: u32 = 1 << 3;
    /// Response contains the opcode.
    pub const MMC_RSP_OPCODE: u32 = 1 << 4;

    /// Addressed command, no data transfer.
    pub const MMC_CMD_AC: u32 = 0;
    /// Addressed command with data transfer.
    pub const MMC_CMD_ADTC: u32 = 1 << 5;

    /// SPI one-byte status response.
    pub const MMC_RSP_SPI_S1: u32 = 1 << 7;
    /// SPI card may send busy.
    pub const MMC_RSP_SPI_BUSY: u32 = 1 << 10;

    /// `R1` response.
    pub const MMC_RSP_R1: u32 = MMC_RSP_PRESENT | MMC_RSP_CRC | MMC_RSP_OPCODE;
    /// `R1b` response: `R1` plus busy signalling.
    pub const MMC_RSP_R1B: u32 = MMC_RSP_PRESENT | MMC_RSP_CRC | MMC_RSP_OPCODE | MMC_RSP_BUSY;
    /// SPI `R1` response.
    pub const MMC_RSP_SPI_R1: u32 = MMC_RSP_SPI_S1;
    /// SPI `R1b` response.
    pub const MMC_RSP_SPI_R1B: u32 = MMC_RSP_SPI_S1 | MMC_RSP_SPI_BUSY;
}

/// Bit layout of `PARTITION_CONFIG`.
pub mod partition_config {
    /// First bit of `BOOT_PARTITION_ENABLE`.
    pub const BOOT_PARTITION_ENABLE_SHIFT: u8 = 3;
    /// Mask of `BOOT_PARTITION_ENABLE` (bits 3–5).
    pub const BOOT_PARTITION_ENABLE_MASK: u8 = 0b0011_1000;
    /// Mask of `PARTITION_ACCESS` (bits 0–2).
    pub const PARTITION_ACCESS_MASK: u8 = 0b0000_0111;
    /// `BOOT_ACK` bit.
    pub const BOOT_ACK: u8 = 1 << 6;

    /// `BOOT_PARTITION_ENABLE`: no boot partition enabled.
    pub const ENABLE_NONE: u8 = 0;
    /// `BOOT_PARTITION_ENABLE`: boot partition 1 (`boot0`).
    pub const ENABLE_BOOT1: u8 = 1;
    /// `BOOT_PARTITION_ENABLE`: boot partition 2 (`boot1`).
    pub const ENABLE_BOOT2: u8 = 2;
    /// `BOOT_PARTITION_ENABLE`: user data area.
    pub const ENABLE_USER: u8 = 7;
}
