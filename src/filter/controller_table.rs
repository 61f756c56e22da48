const CHANNELS: usize = 16;
const CONTROLLERS: usize = 128;
const UNSET: i16 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerTable {
    cells: [[i16; CONTROLLERS]; CHANNELS],
}

impl ControllerTable {
    pub fn new() -> Self {
        Self {
            cells: [[UNSET; CONTROLLERS]; CHANNELS],
        }
    }

    /// `channel` is 1-16. Returns `None` until a value was stored.
    pub fn get(&self, channel: u8, controller: u8) -> Option<u8> {
        let cell = self.cells[index(channel)][usize::from(controller & 0x7f)];
        (cell != UNSET).then_some(cell as u8)
    }

    pub fn set(&mut self, channel: u8, controller: u8, value: u8) {
        self.cells[index(channel)][usize::from(controller & 0x7f)] = i16::from(value & 0x7f);
    }
}

impl Default for ControllerTable {
    fn default() -> Self {
        Self::new()
    }
}

fn index(channel: u8) -> usize {
    usize::from(channel.clamp(1, 16) - 1)
}
