//! 14-bit controller assembly from MSB (0-31) / LSB (32-63) CC pairs.

use super::controller_table::ControllerTable;

const LSB_OFFSET: u8 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourteenBitEvent {
    pub channel: u8,
    pub controller: u8,
    pub value: u16,
}

/// Feeds one controller message into `table`. An MSB signals a change only
/// when its value differs from the stored one (the paired LSB is reset to 0);
/// an LSB signals whenever its MSB was seen before. Controllers 64 and up are
/// ignored.
pub fn observe(
    table: &mut ControllerTable,
    channel: u8,
    controller: u8,
    value: u8,
) -> Option<FourteenBitEvent> {
    if controller >= 2 * LSB_OFFSET {
        return None;
    }

    let previous = table.get(channel, controller);
    table.set(channel, controller, value);

    let msb_controller = if controller < LSB_OFFSET {
        if previous == Some(value) {
            // same coarse value, wait for the LSB
            return None;
        }
        table.set(channel, controller + LSB_OFFSET, 0);
        controller
    } else {
        let msb_controller = controller - LSB_OFFSET;
        table.get(channel, msb_controller)?;
        msb_controller
    };

    Some(FourteenBitEvent {
        channel,
        controller: msb_controller,
        value: value_of(table, channel, msb_controller),
    })
}

/// `(msb << 7) | lsb` read from the table; unset cells count as 0.
pub fn value_of(table: &ControllerTable, channel: u8, msb_controller: u8) -> u16 {
    let msb = table.get(channel, msb_controller).unwrap_or(0);
    let lsb = table.get(channel, msb_controller + LSB_OFFSET).unwrap_or(0);
    (u16::from(msb) << 7) | u16::from(lsb)
}
