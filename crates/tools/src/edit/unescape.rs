//! Corrective unescape pass for over-escaped edit arguments.
//!
//! Models frequently send `old_str`/`new_str` with escape sequences spelled
//! out (`\n` as two characters, `\"` for a quote). The text is read as the
//! body of a double-quoted string literal; when that reading is valid the
//! decoded form is used, otherwise the text is left alone.

/// Result of trying to read text as an escaped literal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// The text decoded cleanly. May equal the input when it had no escapes.
    Applied(String),
    /// The text is not a valid literal body; keep it as given.
    NotApplicable,
}

impl Correction {
    /// The corrected text, or `original` when no correction applies.
    pub fn or_original(self, original: &str) -> String {
        match self {
            Self::Applied(text) => text,
            Self::NotApplicable => original.to_string(),
        }
    }
}

/// Decode `input` as the inside of a double-quoted literal.
///
/// Recognised escapes: `\a \b \f \n \r \t \v \\ \"`, `\xHH`, three-digit
/// octal `\NNN`, `\uHHHH` and `\UHHHHHHHH`. A raw newline, a bare `"`, any
/// other escape, or a byte escape above 0x7F makes the correction
/// inapplicable.
pub fn unescape(input: &str) -> Correction {
    match decode(input) {
        Some(text) => Correction::Applied(text),
        None => Correction::NotApplicable,
    }
}

/// [`unescape`] with the fallback already applied.
pub fn correct(input: &str) -> String {
    unescape(input).or_original(input)
}

fn decode(input: &str) -> Option<String> {
    if !input.contains(['\\', '"', '\n']) {
        return Some(input.to_string());
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\n' | '"' => return None,
            '\\' => out.push(decode_escape(&mut chars)?),
            other => out.push(other),
        }
    }
    Some(out)
}

fn decode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let c = match chars.next()? {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{0B}',
        '\\' => '\\',
        '"' => '"',
        'x' => ascii(hex_digits(chars, 2)?)?,
        'u' => char::from_u32(hex_digits(chars, 4)?)?,
        'U' => char::from_u32(hex_digits(chars, 8)?)?,
        first @ '0'..='7' => {
            let mut value = first.to_digit(8)?;
            for _ in 0..2 {
                value = value * 8 + chars.next()?.to_digit(8)?;
            }
            ascii(value)?
        }
        _ => return None,
    };
    Some(c)
}

fn hex_digits(chars: &mut std::str::Chars<'_>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value.checked_mul(16)? + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Byte escapes must stay ASCII to keep the result valid UTF-8.
fn ascii(value: u32) -> Option<char> {
    if value <= 0x7F { char::from_u32(value) } else { None }
}
