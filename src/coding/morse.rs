//! International Morse symbol table.

use std::fmt;

/// One keyed element of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// The smallest unit of time in morse code
    Dot,
    /// Three times the length of a dot
    Dash,
}

/// What a supported character turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Letter(&'static [Symbol]),
    /// A space between words.
    /// Carries no tone, only the letter gap every character gets.
    WordGap,
}

/// Returned by [`lookup`] for characters without a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCharacter(pub char);

impl fmt::Display for UnknownCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown character: {:?}", self.0)
    }
}

impl std::error::Error for UnknownCharacter {}

impl Symbol {
    /// Units the tone is held for.
    pub const fn tone_units(&self) -> u64 {
        match self {
            Self::Dot => 1,
            Self::Dash => 3,
        }
    }

    /// Units the symbol takes up including its one unit gap.
    pub const fn units(&self) -> u64 {
        self.tone_units() + 1
    }

    pub const fn as_char(&self) -> char {
        match self {
            Self::Dot => '.',
            Self::Dash => '-',
        }
    }
}

/// Finds the encoding of a character, ignoring case.
pub fn lookup(c: char) -> Result<Encoding, UnknownCharacter> {
    let index = match c.to_ascii_uppercase() {
        ' ' => return Ok(Encoding::WordGap),
        e @ 'A'..='Z' => e as u8 - b'A',
        e @ '0'..='9' => e as u8 - b'0' + 26,
        '.' => 36,
        ',' => 37,
        '?' => 38,
        '\'' => 39,
        '/' => 40,
        '(' => 41,
        ')' => 42,
        '&' => 43,
        ':' => 44,
        ';' => 45,
        '=' => 46,
        '+' => 47,
        '-' => 48,
        '_' => 49,
        '"' => 50,
        '$' => 51,
        '!' => 52,
        '@' => 53,
        _ => return Err(UnknownCharacter(c)),
    };

    Ok(Encoding::Letter(MORSE_ENCODING[index as usize].1))
}

/// Every character with a symbol sequence, in table order.
/// Letters are listed in upper case.
pub fn table() -> impl Iterator<Item = (char, &'static [Symbol])> {
    MORSE_ENCODING.iter().copied()
}

/// Renders text in dot/dash notation.
/// Letters are separated by a space and words by ` / `, unknown characters are left out.
pub fn encode(text: &str) -> String {
    let mut words = Vec::new();
    let mut letters = Vec::new();

    for c in text.chars() {
        match lookup(c) {
            Ok(Encoding::Letter(symbols)) => {
                letters.push(symbols.iter().map(Symbol::as_char).collect::<String>())
            }
            Ok(Encoding::WordGap) if !letters.is_empty() => {
                words.push(letters.join(" "));
                letters.clear();
            }
            Ok(Encoding::WordGap) | Err(_) => {}
        }
    }

    if !letters.is_empty() {
        words.push(letters.join(" "));
    }

    words.join(" / ")
}

use Symbol::*;
const MORSE_ENCODING: [(char, &[Symbol]); 54] = [
    ('A', &[Dot, Dash]),
    ('B', &[Dash, Dot, Dot, Dot]),
    ('C', &[Dash, Dot, Dash, Dot]),
    ('D', &[Dash, Dot, Dot]),
    ('E', &[Dot]),
    ('F', &[Dot, Dot, Dash, Dot]),
    ('G', &[Dash, Dash, Dot]),
    ('H', &[Dot, Dot, Dot, Dot]),
    ('I', &[Dot, Dot]),
    ('J', &[Dot, Dash, Dash, Dash]),
    ('K', &[Dash, Dot, Dash]),
    ('L', &[Dot, Dash, Dot, Dot]),
    ('M', &[Dash, Dash]),
    ('N', &[Dash, Dot]),
    ('O', &[Dash, Dash, Dash]),
    ('P', &[Dot, Dash, Dash, Dot]),
    ('Q', &[Dash, Dash, Dot, Dash]),
    ('R', &[Dot, Dash, Dot]),
    ('S', &[Dot, Dot, Dot]),
    ('T', &[Dash]),
    ('U', &[Dot, Dot, Dash]),
    ('V', &[Dot, Dot, Dot, Dash]),
    ('W', &[Dot, Dash, Dash]),
    ('X', &[Dash, Dot, Dot, Dash]),
    ('Y', &[Dash, Dot, Dash, Dash]),
    ('Z', &[Dash, Dash, Dot, Dot]),
    ('0', &[Dash, Dash, Dash, Dash, Dash]),
    ('1', &[Dot, Dash, Dash, Dash, Dash]),
    ('2', &[Dot, Dot, Dash, Dash, Dash]),
    ('3', &[Dot, Dot, Dot, Dash, Dash]),
    ('4', &[Dot, Dot, Dot, Dot, Dash]),
    ('5', &[Dot, Dot, Dot, Dot, Dot]),
    ('6', &[Dash, Dot, Dot, Dot, Dot]),
    ('7', &[Dash, Dash, Dot, Dot, Dot]),
    ('8', &[Dash, Dash, Dash, Dot, Dot]),
    ('9', &[Dash, Dash, Dash, Dash, Dot]),
    ('.', &[Dot, Dash, Dot, Dash, Dot, Dash]),
    (',', &[Dash, Dash, Dot, Dot, Dash, Dash]),
    ('?', &[Dot, Dot, Dash, Dash, Dot, Dot]),
    ('\'', &[Dot, Dash, Dash, Dash, Dash, Dot]),
    ('/', &[Dash, Dot, Dot, Dash, Dot]),
    ('(', &[Dash, Dot, Dash, Dash, Dot]),
    (')', &[Dash, Dot, Dash, Dash, Dot, Dash]),
    ('&', &[Dot, Dash, Dot, Dot, Dot]),
    (':', &[Dash, Dash, Dash, Dot, Dot, Dot]),
    (';', &[Dash, Dot, Dash, Dot, Dash, Dot]),
    ('=', &[Dash, Dot, Dot, Dot, Dash]),
    ('+', &[Dot, Dash, Dot, Dash, Dot]),
    ('-', &[Dash, Dot, Dot, Dot, Dot, Dash]),
    ('_', &[Dot, Dot, Dash, Dash, Dot, Dash]),
    ('"', &[Dot, Dash, Dot, Dot, Dash, Dot]),
    ('$', &[Dot, Dot, Dot, Dash, Dot, Dot, Dash]),
    // Some operators send "!" as "---." instead
    ('!', &[Dash, Dot, Dash, Dot, Dash, Dash]),
    ('@', &[Dot, Dash, Dash, Dot, Dash, Dot]),
];
