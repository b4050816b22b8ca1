//! Capture metadata carried from the EXIF reader to the caption builder.
//!
//! Values stay as raw text until a caption clause needs them. Rationals come
//! out of the EXIF reader as `"n/d"`, but hand-entered values such as `"2.8"`
//! or `"50"` are accepted too: [`Fraction`] parses all three forms.
//!
//! Every field is independent. A field that is missing or fails to parse
//! never affects the others.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The capture fields the caption knows how to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataFieldSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<String>,
}

impl MetadataFieldSet {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A non-negative fraction, always stored in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    num: u64,
    den: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFractionError;

impl fmt::Display for ParseFractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("not a non-negative fraction")
    }
}

impl std::error::Error for ParseFractionError {}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Fraction {
    /// Build a reduced fraction. `None` for a zero denominator.
    pub fn new(num: u64, den: u64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den).max(1);
        Some(Self {
            num: num / g,
            den: den / g,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.num
    }

    pub fn denominator(&self) -> u64 {
        self.den
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Parse `"a.b"` as `ab / 10^len(b)`.
    fn from_decimal(s: &str) -> Option<Self> {
        let (int, frac) = s.split_once('.')?;
        if frac.is_empty() && int.is_empty() {
            return None;
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let den = 10u64.checked_pow(frac.len() as u32)?;
        let int: u64 = if int.is_empty() { 0 } else { int.parse().ok()? };
        let frac: u64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
        Self::new(int.checked_mul(den)?.checked_add(frac)?, den)
    }
}

impl FromStr for Fraction {
    type Err = ParseFractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some((n, d)) = s.split_once('/') {
            match (n.trim().parse(), d.trim().parse()) {
                (Ok(n), Ok(d)) => Self::new(n, d),
                _ => None,
            }
        } else if s.contains('.') {
            Self::from_decimal(s)
        } else {
            s.parse().ok().and_then(|n| Self::new(n, 1))
        };
        parsed.ok_or(ParseFractionError)
    }
}

/// Whole numbers print without a denominator (`2`, not `2/1`).
impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
