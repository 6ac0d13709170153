//! RTT classification into visual tokens.
//!
//! Every sample maps to a glyph from an eight-level bar scale (20ms bands)
//! and to one of three latency colors. The two scales are independent:
//! a 45ms and a 95ms sample share the medium color but not the glyph.

use serde::{Serialize, Serializer};

use crate::source::Rtt;

/// Bar characters, lightest to heaviest.
pub const BAR_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Glyph and label used for a failed check.
pub const UNREACHABLE_GLYPH: char = '×';

/// Width of one glyph band in milliseconds.
pub const BAND_WIDTH_MS: u64 = 20;

/// Samples below this are fast.
pub const FAST_LIMIT_MS: u64 = 40;

/// Samples below this (and at least [`FAST_LIMIT_MS`]) are medium.
pub const MEDIUM_LIMIT_MS: u64 = 100;

/// Latency color tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    /// Under 40ms.
    Fast,
    /// 40ms up to 99ms.
    Medium,
    /// 100ms and above.
    Slow,
    /// Unreachable samples.
    Neutral,
}

impl ColorClass {
    /// Color tier for a successful sample.
    pub fn for_millis(ms: u64) -> Self {
        if ms < FAST_LIMIT_MS {
            ColorClass::Fast
        } else if ms < MEDIUM_LIMIT_MS {
            ColorClass::Medium
        } else {
            ColorClass::Slow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorClass::Fast => "fast",
            ColorClass::Medium => "medium",
            ColorClass::Slow => "slow",
            ColorClass::Neutral => "neutral",
        }
    }
}

/// The symbol part of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Bar of the given level, `0..=7`.
    Bar(u8),
    Unreachable,
}

impl Glyph {
    /// Bar glyph for a successful sample. The top band is open-ended.
    pub fn for_millis(ms: u64) -> Self {
        let band = (ms / BAND_WIDTH_MS).min(BAR_CHARS.len() as u64 - 1);
        Glyph::Bar(band as u8)
    }

    pub fn as_char(self) -> char {
        match self {
            Glyph::Bar(level) => BAR_CHARS[usize::from(level).min(BAR_CHARS.len() - 1)],
            Glyph::Unreachable => UNREACHABLE_GLYPH,
        }
    }

    /// Intensity level, `None` for the unreachable glyph.
    pub fn level(self) -> Option<u8> {
        match self {
            Glyph::Bar(level) => Some(level),
            Glyph::Unreachable => None,
        }
    }
}

impl Serialize for Glyph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

/// The rendered unit for one history sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub symbol: Glyph,
    pub color: ColorClass,
}

impl Token {
    pub const UNREACHABLE: Token = Token {
        symbol: Glyph::Unreachable,
        color: ColorClass::Neutral,
    };
}

/// Map a sample to its token.
pub fn classify(sample: Rtt) -> Token {
    match sample {
        Rtt::Unreachable => Token::UNREACHABLE,
        Rtt::Millis(ms) => Token {
            symbol: Glyph::for_millis(ms),
            color: ColorClass::for_millis(ms),
        },
    }
}
