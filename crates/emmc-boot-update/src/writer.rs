//! Full-length firmware image transfer into a boot partition.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use emmc_ext_csd::BootPartition;
use tracing::{debug, info};

use crate::error::UpdateError;
use crate::layout::DeviceLayout;

const STREAM_BUFFER_LEN: usize = 64 * 1024;

/// One copy primitive from the image into the partition.
///
/// A call may move fewer bytes than asked for; [`transfer_all`] keeps calling
/// with the remaining length until the image is complete.
pub trait ImageTransfer {
    /// Move at most `remaining` bytes and return how many were moved.
    fn transfer(&mut self, remaining: u64) -> io::Result<u64>;
}

impl<T: ImageTransfer + ?Sized> ImageTransfer for &mut T {
    fn transfer(&mut self, remaining: u64) -> io::Result<u64> {
        (**self).transfer(remaining)
    }
}

/// Buffered `Read` to `Write` copy, used where `sendfile(2)` is unavailable.
#[derive(Debug)]
pub struct StreamTransfer<R, W> {
    source: R,
    dest: W,
    buffer: Vec<u8>,
}

impl<R: Read, W: Write> StreamTransfer<R, W> {
    /// Copy from `source` to `dest` through a 64 KiB buffer.
    pub fn new(source: R, dest: W) -> Self {
        Self {
            source,
            dest,
            buffer: vec![0u8; STREAM_BUFFER_LEN],
        }
    }

    /// Recover the destination.
    pub fn into_dest(self) -> W {
        self.dest
    }
}

impl<R: Read, W: Write> ImageTransfer for StreamTransfer<R, W> {
    fn transfer(&mut self, remaining: u64) -> io::Result<u64> {
        let want = usize::try_from(remaining)
            .unwrap_or(self.buffer.len())
            .min(self.buffer.len());
        let Some(chunk) = self.buffer.get_mut(..want) else {
            return Ok(0);
        };
        let read = self.source.read(chunk)?;
        let data = chunk.get(..read).unwrap_or_default();
        self.dest.write_all(data)?;
        Ok(read as u64)
    }
}

/// Drive `transfer` until exactly `total` bytes have been moved.
///
/// Every call asks for the remaining length. The first error aborts the
/// copy. A call that moves nothing, or more than was asked for, before the
/// total is reached is an error too, so the loop cannot spin or overshoot.
pub fn transfer_all<T: ImageTransfer + ?Sized>(transfer: &mut T, total: u64) -> io::Result<u64> {
    let mut transferred = 0u64;
    let mut calls = 0u64;
    while transferred < total {
        let remaining = total.saturating_sub(transferred);
        let moved = transfer.transfer(remaining)?;
        calls = calls.saturating_add(1);
        if moved == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("transfer stalled after {transferred} of {total} bytes"),
            ));
        }
        if moved > remaining {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("transfer reported {moved} bytes with only {remaining} remaining"),
            ));
        }
        transferred = transferred.saturating_add(moved);
        debug!(transferred, total, "Firmware transfer progress");
    }
    debug!(calls, total, "Firmware transfer complete");
    Ok(transferred)
}

#[cfg(target_os = "linux")]
fn copy_image(image: &File, partition: &File, total: u64) -> io::Result<u64> {
    let mut transfer = crate::linux::SendfileTransfer::new(image, partition);
    transfer_all(&mut transfer, total)
}

#[cfg(not(target_os = "linux"))]
fn copy_image(image: &File, partition: &File, total: u64) -> io::Result<u64> {
    let mut transfer = StreamTransfer::new(image, partition);
    transfer_all(&mut transfer, total)
}

/// Write the whole image at `image_path` into `partition`.
///
/// The partition node is opened first, then the image; the image length is
/// taken from its metadata and the image must be a regular file. Data is synced to the device before returning so
/// the boot switch never runs ahead of the image. Both handles are closed on
/// every path.
pub fn write_image(
    layout: &DeviceLayout,
    image_path: &Path,
    partition: BootPartition,
) -> Result<u64, UpdateError> {
    let node = layout.boot_partition_node(partition);
    let write_error = |source: io::Error| UpdateError::ImageWrite {
        partition,
        path: node.clone(),
        source,
    };

    let dest = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&node)
        .map_err(write_error)?;

    let image = File::open(image_path).map_err(|source| UpdateError::ImageOpen {
        path: image_path.to_path_buf(),
        source,
    })?;

    let metadata = image.metadata().map_err(|source| UpdateError::ImageStat {
        path: image_path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        let errno = if metadata.is_dir() {
            libc::EISDIR
        } else {
            libc::EINVAL
        };
        return Err(UpdateError::ImageOpen {
            path: image_path.to_path_buf(),
            source: io::Error::from_raw_os_error(errno),
        });
    }
    let total = metadata.len();

    info!(
        image = %image_path.display(),
        partition = %node.display(),
        bytes = total,
        "Writing firmware image"
    );

    let written = copy_image(&image, &dest, total).map_err(write_error)?;
    dest.sync_all().map_err(write_error)?;

    info!(bytes = written, partition = %node.display(), "Firmware image written");
    Ok(written)
}
