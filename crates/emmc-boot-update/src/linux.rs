//! Linux backends: `MMC_IOC_CMD` for card commands, `sendfile(2)` for image copies.
//!
//! The ioctl request encoding follows the generic `_IOC` layout used by
//! x86, arm and riscv.

#![expect(unsafe_code, reason = "MMC_IOC_CMD and sendfile are raw syscalls")]

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use emmc_ext_csd::{EXT_CSD_LEN, ExtCsd, ReadExtCsdCommand, SwitchCommand};
use tracing::debug;

use crate::channel::MmcCommandChannel;
use crate::writer::ImageTransfer;

const MMC_BLOCK_MAJOR: u8 = 179;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_READ_WRITE: u32 = 3;

/// Largest count a single `sendfile` call moves on Linux.
const MAX_SENDFILE_CHUNK: usize = 0x7fff_f000;

/// `struct mmc_ioc_cmd` from `include/uapi/linux/mmc/ioctl.h`.
#[repr(C)]
#[derive(Debug, Default)]
struct MmcIocCmd {
    write_flag: libc::c_int,
    is_acmd: libc::c_int,
    opcode: u32,
    arg: u32,
    response: [u32; 4],
    flags: libc::c_uint,
    blksz: libc::c_uint,
    blocks: libc::c_uint,
    postsleep_min_us: libc::c_uint,
    postsleep_max_us: libc::c_uint,
    data_timeout_ns: libc::c_uint,
    cmd_timeout_ms: libc::c_uint,
    pad: u32,
    data_ptr: u64,
}

const fn ioctl_code(direction: u32, kind: u8, nr: u8, size: usize) -> libc::c_ulong {
    ((direction << IOC_DIRSHIFT)
        | ((kind as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::c_ulong
}

/// `_IOWR(MMC_BLOCK_MAJOR, 0, struct mmc_ioc_cmd)`
const MMC_IOC_CMD: libc::c_ulong = ioctl_code(
    IOC_READ_WRITE,
    MMC_BLOCK_MAJOR,
    0,
    std::mem::size_of::<MmcIocCmd>(),
);

/// An eMMC whole-device node opened for card commands.
#[derive(Debug)]
pub struct LinuxMmcDevice {
    file: File,
    path: PathBuf,
}

impl LinuxMmcDevice {
    /// Open the whole-device node (e.g. `/dev/mmcblk0`) read/write.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        debug!(device = %path.display(), "Opened eMMC block device");
        Ok(Self { file, path })
    }

    /// Path of the opened node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn submit(&self, cmd: &mut MmcIocCmd) -> io::Result<()> {
        let fd = self.file.as_raw_fd();
        // SAFETY: `fd` stays open for the borrow of `self.file`, `cmd` is a
        // live `#[repr(C)]` mmc_ioc_cmd and any data buffer it points at is
        // owned by the caller for the duration of this blocking call.
        let rc = unsafe { libc::ioctl(fd, MMC_IOC_CMD as _, std::ptr::from_mut(cmd)) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl MmcCommandChannel for LinuxMmcDevice {
    fn read_register(&mut self) -> io::Result<ExtCsd> {
        let mut raw = [0u8; EXT_CSD_LEN];
        let mut cmd = MmcIocCmd {
            write_flag: 0,
            opcode: ReadExtCsdCommand::OPCODE,
            arg: ReadExtCsdCommand::ARG,
            flags: ReadExtCsdCommand::FLAGS,
            blksz: ReadExtCsdCommand::BLOCK_SIZE,
            blocks: ReadExtCsdCommand::BLOCKS,
            data_ptr: raw.as_mut_ptr() as u64,
            ..MmcIocCmd::default()
        };
        self.submit(&mut cmd)?;
        debug!(device = %self.path.display(), "Read EXT_CSD");
        Ok(ExtCsd::new(raw))
    }

    fn write_register_byte(&mut self, command: &SwitchCommand) -> io::Result<()> {
        let mut cmd = MmcIocCmd {
            write_flag: 1,
            opcode: SwitchCommand::OPCODE,
            arg: command.arg(),
            flags: SwitchCommand::FLAGS,
            cmd_timeout_ms: 0,
            ..MmcIocCmd::default()
        };
        self.submit(&mut cmd)?;
        debug!(
            device = %self.path.display(),
            index = command.index(),
            value = format_args!("{:#04x}", command.value()),
            "Wrote EXT_CSD byte"
        );
        Ok(())
    }
}

/// In-kernel copy from the image file into the boot partition node.
///
/// Uses and advances the file position of `source`.
#[derive(Debug)]
pub struct SendfileTransfer<'a> {
    source: &'a File,
    dest: &'a File,
}

impl<'a> SendfileTransfer<'a> {
    /// Copy from `source` to `dest`.
    pub fn new(source: &'a File, dest: &'a File) -> Self {
        Self { source, dest }
    }
}

impl ImageTransfer for SendfileTransfer<'_> {
    fn transfer(&mut self, remaining: u64) -> io::Result<u64> {
        let count = usize::try_from(remaining)
            .unwrap_or(MAX_SENDFILE_CHUNK)
            .min(MAX_SENDFILE_CHUNK);
        // SAFETY: both descriptors are borrowed from open `File`s for the
        // whole call; a null offset makes the kernel use the file position
        // of `source` instead of dereferencing a pointer.
        let rc = unsafe {
            libc::sendfile(
                self.dest.as_raw_fd(),
                self.source.as_raw_fd(),
                std::ptr::null_mut(),
                count,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(rc.unsigned_abs() as u64)
    }
}
