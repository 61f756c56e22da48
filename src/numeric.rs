//! Number and note-name parsing/rendering shared by the interpreter, the
//! filters and the renderer.

pub const DEFAULT_OCTAVE_MIDDLE_C: i32 = 3;

const MAX_7BIT: i32 = 0x7f;
const MAX_14BIT: i32 = 0x3fff;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    #[default]
    Decimal,
    Hexadecimal,
}

/// Parses `value` as an integer. A trailing `H` forces hexadecimal, a trailing
/// `M` forces decimal, anything else uses `radix`. Never fails: text without
/// digits parses to 0.
pub fn parse_int(value: &str, radix: Radix) -> i32 {
    if let Some(digits) = strip_suffix_ignore_case(value, 'h') {
        parse_hex(digits)
    } else if let Some(digits) = strip_suffix_ignore_case(value, 'm') {
        parse_decimal(digits)
    } else {
        match radix {
            Radix::Decimal => parse_decimal(value),
            Radix::Hexadecimal => parse_hex(value),
        }
    }
}

pub fn parse_7bit(value: &str, radix: Radix) -> u8 {
    clamp_7bit(parse_int(value, radix))
}

pub fn parse_14bit(value: &str, radix: Radix) -> u16 {
    clamp_14bit(parse_int(value, radix))
}

pub fn clamp_7bit(value: i32) -> u8 {
    value.clamp(0, MAX_7BIT) as u8
}

pub fn clamp_14bit(value: i32) -> u16 {
    value.clamp(0, MAX_14BIT) as u16
}

pub fn parse_note(value: &str, radix: Radix, octave_middle_c: i32) -> u8 {
    match parse_note_name(value, octave_middle_c) {
        Some(note) => clamp_7bit(note),
        None => parse_7bit(value, radix),
    }
}

fn parse_note_name(value: &str, octave_middle_c: i32) -> Option<i32> {
    let upper = value.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() < 2 || !bytes[bytes.len() - 1].is_ascii_digit() {
        return None;
    }

    let mut note = match bytes[0] {
        b'C' => 0,
        b'D' => 2,
        b'E' => 4,
        b'F' => 5,
        b'G' => 7,
        b'A' => 9,
        b'B' | b'H' => 11,
        _ => return None,
    };
    match bytes[1] {
        b'B' => note -= 1,
        b'#' => note += 1,
        _ => {}
    }

    let octave = trailing_int(&upper).saturating_add(5).saturating_sub(octave_middle_c);
    Some(octave.saturating_mul(12).saturating_add(note))
}

fn trailing_int(value: &str) -> i32 {
    let digits_start = value
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let magnitude = parse_decimal(&value[digits_start..]);
    if value[..digits_start].ends_with('-') {
        -magnitude
    } else {
        magnitude
    }
}

fn strip_suffix_ignore_case(value: &str, suffix: char) -> Option<&str> {
    value
        .strip_suffix(suffix)
        .or_else(|| value.strip_suffix(suffix.to_ascii_uppercase()))
}

/// Optional sign followed by leading digits; everything after them is ignored.
fn parse_decimal(value: &str) -> i32 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let mut result: i32 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        result = result.saturating_mul(10).saturating_add(d as i32);
    }
    if negative { -result } else { result }
}

/// Accumulates every hex digit in the string, skipping anything else.
fn parse_hex(value: &str) -> i32 {
    value
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0i32, |acc, d| acc.saturating_mul(16).saturating_add(d as i32))
}

pub fn format_7bit(value: u8, radix: Radix) -> String {
    match radix {
        Radix::Decimal => value.to_string(),
        Radix::Hexadecimal => format_7bit_hex(value),
    }
}

pub fn format_7bit_hex(value: u8) -> String {
    format!("{value:02X}")
}

pub fn format_14bit(value: u16, radix: Radix) -> String {
    match radix {
        Radix::Decimal => value.to_string(),
        Radix::Hexadecimal => format!("{value:04X}"),
    }
}

pub fn note_name(note: u8, octave_middle_c: i32) -> String {
    let octave = i32::from(note) / 12 + octave_middle_c - 5;
    format!("{}{}", NOTE_NAMES[usize::from(note % 12)], octave)
}
