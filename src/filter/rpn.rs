//! RPN/NRPN assembly from controller bursts.
//!
//! Parameter number MSB/LSB may arrive in either order and must both precede
//! the value. A value MSB (CC 6) emits a 7-bit message; a following value LSB
//! (CC 38) emits again with the full 14-bit value.

const NRPN_LSB: u8 = 98;
const NRPN_MSB: u8 = 99;
const RPN_LSB: u8 = 100;
const RPN_MSB: u8 = 101;
const DATA_ENTRY_MSB: u8 = 6;
const DATA_ENTRY_LSB: u8 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpnMessage {
    pub channel: u8,
    pub parameter: u16,
    /// `msb << 7`, plus the LSB when one was sent.
    pub value: u16,
    pub is_nrpn: bool,
    pub uses_both_msb_and_lsb: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ChannelState {
    parameter_msb: Option<u8>,
    parameter_lsb: Option<u8>,
    value_msb: Option<u8>,
    value_lsb: Option<u8>,
    is_nrpn: bool,
}

impl ChannelState {
    fn handle(&mut self, channel: u8, controller: u8, value: u8) -> Option<RpnMessage> {
        match controller {
            NRPN_LSB | RPN_LSB => {
                self.parameter_lsb = Some(value);
                self.reset_value();
                self.is_nrpn = controller == NRPN_LSB;
                None
            }
            NRPN_MSB | RPN_MSB => {
                self.parameter_msb = Some(value);
                self.reset_value();
                self.is_nrpn = controller == NRPN_MSB;
                None
            }
            DATA_ENTRY_MSB => {
                self.value_msb = Some(value);
                self.value_lsb = None;
                self.message(channel)
            }
            DATA_ENTRY_LSB => {
                self.value_lsb = Some(value);
                self.message(channel)
            }
            _ => None,
        }
    }

    fn reset_value(&mut self) {
        self.value_msb = None;
        self.value_lsb = None;
    }

    fn message(&self, channel: u8) -> Option<RpnMessage> {
        let parameter = (u16::from(self.parameter_msb?) << 7) | u16::from(self.parameter_lsb?);
        let msb = u16::from(self.value_msb?) << 7;
        Some(RpnMessage {
            channel,
            parameter,
            value: msb + self.value_lsb.map_or(0, u16::from),
            is_nrpn: self.is_nrpn,
            uses_both_msb_and_lsb: self.value_lsb.is_some(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpnAssembler {
    channels: [ChannelState; 16],
}

impl RpnAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, channel: u8, controller: u8, value: u8) -> Option<RpnMessage> {
        let index = usize::from(channel.clamp(1, 16) - 1);
        self.channels[index].handle(channel, controller, value & 0x7f)
    }
}
