//! Typed view over the EXT_CSD register snapshot.

use serde::{Deserialize, Serialize};

use crate::consts::{EXT_CSD_LEN, EXT_CSD_PARTITION_CONFIG, partition_config};

const PARTITION_CONFIG_INDEX: usize = EXT_CSD_PARTITION_CONFIG as usize;

/// Returned when a byte slice is not exactly one EXT_CSD block long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("EXT_CSD snapshot must be {EXT_CSD_LEN} bytes, got {actual}")]
pub struct InvalidExtCsdLength {
    /// Length of the rejected slice.
    pub actual: usize,
}

/// Immutable 512-byte snapshot of the extended CSD register.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtCsd([u8; EXT_CSD_LEN]);

impl ExtCsd {
    /// Wrap a raw register block.
    pub const fn new(raw: [u8; EXT_CSD_LEN]) -> Self {
        Self(raw)
    }

    /// An all-zero register, as reported by a device that was never configured.
    pub const fn zeroed() -> Self {
        Self([0u8; EXT_CSD_LEN])
    }

    /// Raw register bytes.
    pub fn as_bytes(&self) -> &[u8; EXT_CSD_LEN] {
        &self.0
    }

    /// The `PARTITION_CONFIG` byte.
    pub fn partition_config(&self) -> PartitionConfig {
        PartitionConfig(self.0[PARTITION_CONFIG_INDEX])
    }

    /// Copy of this snapshot with `PARTITION_CONFIG` replaced.
    ///
    /// This is what the device holds after a successful `CMD6` write of `value`.
    pub fn with_partition_config(&self, value: PartitionConfig) -> Self {
        let mut raw = self.0;
        raw[PARTITION_CONFIG_INDEX] = value.raw();
        Self(raw)
    }
}

impl Default for ExtCsd {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl From<[u8; EXT_CSD_LEN]> for ExtCsd {
    fn from(raw: [u8; EXT_CSD_LEN]) -> Self {
        Self(raw)
    }
}

impl TryFrom<&[u8]> for ExtCsd {
    type Error = InvalidExtCsdLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match <[u8; EXT_CSD_LEN]>::try_from(bytes) {
            Ok(raw) => Ok(Self(raw)),
            Err(_) => Err(InvalidExtCsdLength {
                actual: bytes.len(),
            }),
        }
    }
}

impl std::fmt::Debug for ExtCsd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtCsd")
            .field("partition_config", &self.partition_config())
            .finish_non_exhaustive()
    }
}

/// The `PARTITION_CONFIG` byte (EXT_CSD\[179\]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionConfig(u8);

impl PartitionConfig {
    /// Wrap a raw register byte.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw register byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// `BOOT_PARTITION_ENABLE`, bits 3–5.
    pub const fn boot_partition_enable(self) -> u8 {
        (self.0 & partition_config::BOOT_PARTITION_ENABLE_MASK)
            >> partition_config::BOOT_PARTITION_ENABLE_SHIFT
    }

    /// `PARTITION_ACCESS`, bits 0–2.
    pub const fn partition_access(self) -> u8 {
        self.0 & partition_config::PARTITION_ACCESS_MASK
    }

    /// `BOOT_ACK`, bit 6.
    pub const fn boot_ack(self) -> bool {
        self.0 & partition_config::BOOT_ACK != 0
    }

    /// Same byte with `BOOT_PARTITION_ENABLE` replaced by `enable`.
    ///
    /// Only bits 3–5 change; `enable` is truncated to three bits.
    pub const fn with_boot_partition_enable(self, enable: u8) -> Self {
        let cleared = self.0 & !partition_config::BOOT_PARTITION_ENABLE_MASK;
        let field = (enable << partition_config::BOOT_PARTITION_ENABLE_SHIFT)
            & partition_config::BOOT_PARTITION_ENABLE_MASK;
        Self(cleared | field)
    }
}

impl std::fmt::Display for PartitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#04x} (boot_ack={}, boot_partition_enable={}, partition_access={})",
            self.0,
            self.boot_ack(),
            self.boot_partition_enable(),
            self.partition_access()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_accessors() {
        let cfg = PartitionConfig::from_raw(0b0101_0011);
        assert!(cfg.boot_ack());
        assert_eq!(cfg.boot_partition_enable(), 0b010);
        assert_eq!(cfg.partition_access(), 0b011);
    }

    #[test]
    fn test_with_boot_partition_enable_only_touches_bits_3_to_5() {
        let cfg = PartitionConfig::from_raw(0xFF);
        assert_eq!(cfg.with_boot_partition_enable(0).raw(), 0b1100_0111);
        assert_eq!(cfg.with_boot_partition_enable(1).raw(), 0b1100_1111);
        assert_eq!(cfg.with_boot_partition_enable(2).raw(), 0b1101_0111);
    }

    #[test]
    fn test_ext_csd_reads_byte_179() {
        let mut raw = [0u8; EXT_CSD_LEN];
        raw[179] = 0x48;
        raw[178] = 0xFF;
        raw[180] = 0xFF;
        let ext_csd = ExtCsd::new(raw);
        assert_eq!(ext_csd.partition_config().raw(), 0x48);
    }

    #[test]
    fn test_with_partition_config_preserves_other_bytes() {
        let raw = [0xA5u8; EXT_CSD_LEN];
        let before = ExtCsd::new(raw);
        let after = before.with_partition_config(PartitionConfig::from_raw(0x10));
        assert_eq!(after.partition_config().raw(), 0x10);
        let changed = before
            .as_bytes()
            .iter()
            .zip(after.as_bytes().iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_try_from_rejects_wrong_length() -> Result<(), InvalidExtCsdLength> {
        let short = [0u8; 511];
        assert_eq!(
            ExtCsd::try_from(&short[..]),
            Err(InvalidExtCsdLength { actual: 511 })
        );
        let exact = [0u8; EXT_CSD_LEN];
        let ext_csd = ExtCsd::try_from(&exact[..])?;
        assert_eq!(ext_csd, ExtCsd::zeroed());
        Ok(())
    }

    #[test]
    fn test_display() {
        let cfg = PartitionConfig::from_raw(0x48);
        assert_eq!(
            cfg.to_string(),
            "0x48 (boot_ack=true, boot_partition_enable=1, partition_access=0)"
        );
    }
}
