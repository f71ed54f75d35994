//! Privileged MMC command channel.

use std::io;

use emmc_ext_csd::{ExtCsd, SwitchCommand};

/// The two card commands an update needs.
///
/// Implemented by [`LinuxMmcDevice`](crate::linux::LinuxMmcDevice) on top of
/// `MMC_IOC_CMD`; tests substitute a simulated card. Both calls block until
/// the card has answered, there is no cancellation.
pub trait MmcCommandChannel {
    /// Read a fresh EXT_CSD snapshot (`CMD8`).
    fn read_register(&mut self) -> io::Result<ExtCsd>;

    /// Write one EXT_CSD byte (`CMD6`), waiting out card busy.
    fn write_register_byte(&mut self, command: &SwitchCommand) -> io::Result<()>;
}

impl<T: MmcCommandChannel + ?Sized> MmcCommandChannel for &mut T {
    fn read_register(&mut self) -> io::Result<ExtCsd> {
        (**self).read_register()
    }

    fn write_register_byte(&mut self, command: &SwitchCommand) -> io::Result<()> {
        (**self).write_register_byte(command)
    }
}

impl<T: MmcCommandChannel + ?Sized> MmcCommandChannel for Box<T> {
    fn read_register(&mut self) -> io::Result<ExtCsd> {
        (**self).read_register()
    }

    fn write_register_byte(&mut self, command: &SwitchCommand) -> io::Result<()> {
        (**self).write_register_byte(command)
    }
}
