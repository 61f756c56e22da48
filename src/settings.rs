use crate::numeric::{DEFAULT_OCTAVE_MIDDLE_C, Radix};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub radix: Radix,
    pub timestamps: bool,
    pub note_numbers: bool,
    pub octave_middle_c: i32,
    pub quiet: bool,
    pub raw_dump: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radix: Radix::Decimal,
            timestamps: false,
            note_numbers: false,
            octave_middle_c: DEFAULT_OCTAVE_MIDDLE_C,
            quiet: false,
            raw_dump: false,
        }
    }
}
