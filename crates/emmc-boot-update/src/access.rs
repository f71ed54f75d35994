//! Boot partition write protection (`force_ro`).

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use emmc_ext_csd::BootPartition;
use tracing::debug;

use crate::error::UpdateError;
use crate::layout::DeviceLayout;

/// Value written to `force_ro` to make the partition writable.
const FORCE_RO_DISABLE: &[u8] = b"0";

/// Clear the kernel's read-only flag on `partition`.
///
/// Issues exactly one write of ASCII `0`. A short write is reported as
/// `EIO` even when the call itself succeeded.
pub fn clear_write_protection(
    layout: &DeviceLayout,
    partition: BootPartition,
) -> Result<(), UpdateError> {
    let path = layout.force_ro_path(partition);
    let protection_error = |source: io::Error| UpdateError::WriteProtection {
        partition,
        path: path.clone(),
        source,
    };

    let mut control = OpenOptions::new()
        .write(true)
        .open(&path)
        .map_err(protection_error)?;
    write_disable(&mut control, partition, &path)?;

    debug!(control = %path.display(), "Cleared force_ro");
    Ok(())
}

/// One `write` of [`FORCE_RO_DISABLE`] to an open control; fewer bytes
/// accepted is `EIO`.
fn write_disable<W: Write + ?Sized>(
    control: &mut W,
    partition: BootPartition,
    path: &Path,
) -> Result<(), UpdateError> {
    let protection_error = |source: io::Error| UpdateError::WriteProtection {
        partition,
        path: path.to_path_buf(),
        source,
    };

    let written = control.write(FORCE_RO_DISABLE).map_err(protection_error)?;
    if written != FORCE_RO_DISABLE.len() {
        return Err(protection_error(io::Error::from_raw_os_error(libc::EIO)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Accepts at most `limit` bytes per write and counts the calls.
    struct ShortWriter {
        limit: usize,
        calls: usize,
        data: Vec<u8>,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            let n = buf.len().min(self.limit);
            self.data.extend_from_slice(buf.get(..n).unwrap_or_default());
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn short_writer(limit: usize) -> ShortWriter {
        ShortWriter {
            limit,
            calls: 0,
            data: Vec::new(),
        }
    }

    #[test]
    fn test_short_write_is_eio() -> Result<(), Box<dyn std::error::Error>> {
        let path = DeviceLayout::default().force_ro_path(BootPartition::Boot1);
        let mut control = short_writer(0);

        match write_disable(&mut control, BootPartition::Boot1, &path) {
            Err(err @ UpdateError::WriteProtection { .. }) => {
                assert_eq!(err.raw_os_error(), Some(libc::EIO));
                assert_eq!(err.phase(), crate::updater::UpdatePhase::UnlockTarget);
            }
            other => return Err(format!("expected WriteProtection, got {other:?}").into()),
        }
        // A single write call, never retried.
        assert_eq!(control.calls, 1);
        assert!(control.data.is_empty());
        Ok(())
    }

    #[test]
    fn test_full_write_is_single_call() -> Result<(), UpdateError> {
        let path = DeviceLayout::default().force_ro_path(BootPartition::Boot0);
        let mut control = short_writer(8);

        write_disable(&mut control, BootPartition::Boot0, &path)?;
        assert_eq!(control.calls, 1);
        assert_eq!(control.data, b"0");
        Ok(())
    }

    #[test]
    fn test_clears_force_ro() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let layout = DeviceLayout {
            sysfs_block_dir: dir.path().to_path_buf(),
            ..DeviceLayout::default()
        };
        let control = layout.force_ro_path(BootPartition::Boot1);
        if let Some(parent) = control.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&control, "1")?;

        clear_write_protection(&layout, BootPartition::Boot1)?;
        assert_eq!(fs::read_to_string(&control)?, "0");
        Ok(())
    }

    #[test]
    fn test_missing_control_is_write_protection_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let layout = DeviceLayout {
            sysfs_block_dir: dir.path().to_path_buf(),
            ..DeviceLayout::default()
        };

        match clear_write_protection(&layout, BootPartition::Boot0) {
            Err(UpdateError::WriteProtection {
                partition, source, ..
            }) => {
                assert_eq!(partition, BootPartition::Boot0);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => return Err(format!("expected WriteProtection, got {other:?}").into()),
        }
        Ok(())
    }
}
