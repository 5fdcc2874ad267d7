//! Edit-rate / sample-rate pair (§3 Rational).

use crate::byteio::{read_i32, write_i32, ReadSeek, WriteSeek};
use crate::Result;

/// A pair of signed 32-bit integers with quotient semantics ("edit units per
/// second" for an edit rate, samples per second for an audio sample rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: i32,
    pub denominator: i32,
}

impl Rational {
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self { numerator, denominator }
    }

    /// Quotient as `f64`, for converting seconds <-> edit units.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn read(r: &mut dyn ReadSeek) -> Result<Self> {
        Ok(Self { numerator: read_i32(r)?, denominator: read_i32(r)? })
    }

    pub fn write(&self, w: &mut dyn WriteSeek) -> Result<()> {
        write_i32(w, self.numerator)?;
        write_i32(w, self.denominator)
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
