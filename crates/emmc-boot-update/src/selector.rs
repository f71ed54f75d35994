//! Boot partition selection.

use emmc_ext_csd::{BootPartition, ExtCsd, SwitchCommand, encode_switch_command};
use tracing::{debug, error};

use crate::channel::MmcCommandChannel;
use crate::error::UpdateError;

/// Make `target` the partition the boot ROM reads on next power-on.
///
/// `ext_csd` must be the snapshot the target was derived from: the written
/// byte keeps all of its bits except `BOOT_PARTITION_ENABLE`.
pub fn select_boot_partition<C: MmcCommandChannel + ?Sized>(
    channel: &mut C,
    ext_csd: &ExtCsd,
    target: BootPartition,
) -> Result<SwitchCommand, UpdateError> {
    let command = encode_switch_command(ext_csd, target);
    debug!(
        partition = %target,
        previous = format_args!("{:#04x}", ext_csd.partition_config().raw()),
        next = format_args!("{:#04x}", command.value()),
        arg = format_args!("{:#010x}", command.arg()),
        "Submitting PARTITION_CONFIG switch"
    );

    if let Err(source) = channel.write_register_byte(&command) {
        error!(partition = %target, error = %source, "Boot partition switch rejected");
        return Err(UpdateError::BootSelect {
            partition: target,
            source,
        });
    }
    Ok(command)
}
