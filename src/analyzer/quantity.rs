//! Exact resource quantities.
//!
//! Parses Kubernetes resource values (`"50m"`, `"0.05"`, `"500Mi"`, `"1e3"`)
//! into an exact rational value. Quantities written with different suffixes
//! can then be added and multiplied without any floating-point rounding.

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedMul, Zero};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while parsing or combining quantities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// The text is not `<number><optional suffix>`.
    #[error("malformed quantity {0:?}")]
    Malformed(String),

    /// The exact value no longer fits the internal representation.
    #[error("quantity arithmetic overflowed")]
    Overflow,
}

// ============================================================================
// Scales and formats
// ============================================================================

/// Decimal scales, named after their SI suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scale {
    Nano,
    Micro,
    Milli,
    #[default]
    Unit,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
}

impl Scale {
    /// All scales from largest to smallest.
    pub const DESCENDING: [Scale; 10] = [
        Scale::Exa,
        Scale::Peta,
        Scale::Tera,
        Scale::Giga,
        Scale::Mega,
        Scale::Kilo,
        Scale::Unit,
        Scale::Milli,
        Scale::Micro,
        Scale::Nano,
    ];

    /// Power of ten this scale stands for.
    pub fn exponent(self) -> i32 {
        match self {
            Self::Nano => -9,
            Self::Micro => -6,
            Self::Milli => -3,
            Self::Unit => 0,
            Self::Kilo => 3,
            Self::Mega => 6,
            Self::Giga => 9,
            Self::Tera => 12,
            Self::Peta => 15,
            Self::Exa => 18,
        }
    }

    /// SI suffix used when writing a quantity at this scale.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Nano => "n",
            Self::Micro => "u",
            Self::Milli => "m",
            Self::Unit => "",
            Self::Kilo => "k",
            Self::Mega => "M",
            Self::Giga => "G",
            Self::Tera => "T",
            Self::Peta => "P",
            Self::Exa => "E",
        }
    }

    /// Parse a scale from its SI suffix (`""` is the unit scale).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::DESCENDING.into_iter().find(|s| s.suffix() == suffix)
    }
}

/// How a quantity was written, which decides how it is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum QuantityFormat {
    /// `n`, `u`, `m`, `k`, `M`, `G`, `T`, `P`, `E` or no suffix.
    #[default]
    DecimalSI,
    /// `Ki`, `Mi`, `Gi`, `Ti`, `Pi`, `Ei`.
    BinarySI,
    /// `1e3`, `5E-3`.
    DecimalExponent,
}

/// Binary suffixes and the power of two they stand for.
const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 10),
    ("Mi", 20),
    ("Gi", 30),
    ("Ti", 40),
    ("Pi", 50),
    ("Ei", 60),
];

/// Largest accepted magnitude for a `e<int>` exponent suffix.
const MAX_EXPONENT: u32 = 30;

/// Sign, mantissa and optional suffix. The exponent alternative comes first so
/// that `1E3` is an exponent while a bare `1E` is exa.
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+|[KMGTPE]i|[numkMGTPE])?$").unwrap()
});

// ============================================================================
// Quantity
// ============================================================================

/// An exact amount of some resource, e.g. CPU cores or memory bytes.
///
/// The value is kept as a reduced fraction, so `"10m"` plus `"1"` is exactly
/// `"1.01"`. Equality, ordering and hashing look at the value only; the
/// format remembered from parsing only affects how the quantity is printed.
#[derive(Debug, Clone, Default)]
pub struct Quantity {
    value: Ratio<i128>,
    format: QuantityFormat,
}

impl Quantity {
    /// The zero quantity.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A whole number of base units (cores, bytes, ...).
    pub fn from_integer(value: i64) -> Self {
        Self {
            value: Ratio::from_integer(i128::from(value)),
            format: QuantityFormat::DecimalSI,
        }
    }

    /// Parse a quantity string.
    ///
    /// # Examples
    /// - "50m" -> 0.05
    /// - "1.5" -> 1.5
    /// - "500Mi" -> 524288000
    /// - "1e3" -> 1000
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        let malformed = || QuantityError::Malformed(text.to_string());

        let caps = QUANTITY_REGEX.captures(text.trim()).ok_or_else(malformed)?;
        let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
        let number = caps.get(2).ok_or_else(malformed)?.as_str();
        let suffix = caps.get(3).map_or("", |m| m.as_str());

        let mantissa = parse_mantissa(number).map_err(|e| match e {
            QuantityError::Malformed(_) => malformed(),
            overflow => overflow,
        })?;
        let (multiplier, format) = suffix_multiplier(suffix).ok_or_else(malformed)?;
        let value = mantissa
            .checked_mul(&multiplier)
            .ok_or(QuantityError::Overflow)?;

        Ok(Self {
            value: if negative { -value } else { value },
            format,
        })
    }

    /// The format this quantity is printed in.
    pub fn format(&self) -> QuantityFormat {
        self.format
    }

    /// Check whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Exact sum of two quantities. The result keeps this quantity's format.
    pub fn checked_add(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        let value = self
            .value
            .checked_add(&other.value)
            .ok_or(QuantityError::Overflow)?;
        Ok(Self {
            value,
            format: self.format,
        })
    }

    /// Exact product with a non-negative integer, computed as one
    /// multiplication. A factor of zero yields zero.
    pub fn multiply_by_factor(&self, factor: u64) -> Result<Quantity, QuantityError> {
        let value = self
            .value
            .checked_mul(&Ratio::from_integer(i128::from(factor)))
            .ok_or(QuantityError::Overflow)?;
        Ok(Self {
            value,
            format: self.format,
        })
    }

    /// The value expressed in `scale` units, rounded up.
    ///
    /// Only meant for display; saturates instead of failing on overflow.
    ///
    /// # Examples
    /// - "500Mi" at Mega -> 525
    /// - "1.01" at Milli -> 1010
    pub fn scaled_value(&self, scale: Scale) -> i128 {
        let numer = *self.value.numer();
        let denom = *self.value.denom();
        let exponent = scale.exponent();
        let power = 10i128.pow(exponent.unsigned_abs());

        if exponent >= 0 {
            match denom.checked_mul(power) {
                Some(divisor) => ceil_div(numer, divisor),
                // |numer| < divisor, so the quotient lies in (-1, 1).
                None => i128::from(numer > 0),
            }
        } else {
            match numer.checked_mul(power) {
                Some(scaled) => ceil_div(scaled, denom),
                None if numer > 0 => i128::MAX,
                None => i128::MIN,
            }
        }
    }

    /// The value in thousandths of a unit, rounded up.
    pub fn milli_value(&self) -> i128 {
        self.scaled_value(Scale::Milli)
    }

    /// Largest binary suffix giving an integral mantissa.
    fn binary_form(&self) -> Option<(i128, &'static str)> {
        if !self.value.is_integer() {
            return None;
        }
        let whole = self.value.to_integer();
        BINARY_SUFFIXES.iter().rev().find_map(|&(suffix, power)| {
            let unit = 1i128 << power;
            (whole % unit == 0).then(|| (whole / unit, suffix))
        })
    }

    /// Largest decimal scale giving an integral mantissa.
    fn decimal_form(&self) -> Option<(i128, Scale)> {
        Scale::DESCENDING.into_iter().find_map(|scale| {
            let factor = pow10(-scale.exponent()).ok()?;
            let rescaled = self.value.checked_mul(&factor)?;
            rescaled
                .is_integer()
                .then(|| (rescaled.to_integer(), scale))
        })
    }

    /// Plain decimal text for values finer than a nano unit.
    ///
    /// Denominators only hold factors 2 and 5, so some `10^k` with
    /// `k <= 38` is a multiple of them and the expansion is exact.
    fn plain_decimal(&self) -> String {
        let numer = *self.value.numer();
        let denom = *self.value.denom();
        let digits = (0..=38u32)
            .find(|&k| 10i128.pow(k) % denom == 0)
            .unwrap_or(38);

        let sign = if numer < 0 { "-" } else { "" };
        let whole = (numer / denom).unsigned_abs();
        // remainder < denom, so the scaled remainder stays below 10^digits
        let fraction = (numer % denom).unsigned_abs() * (10u128.pow(digits) / denom.unsigned_abs());
        let fraction = format!("{:0width$}", fraction, width = digits as usize);
        let fraction = fraction.trim_end_matches('0');

        if fraction.is_empty() {
            format!("{sign}{whole}")
        } else {
            format!("{sign}{whole}.{fraction}")
        }
    }
}

/// Parse the digits of a mantissa such as `12`, `1.5`, `.5` or `5.`.
///
/// The whole and fractional parts are read separately, so a long fraction
/// only overflows when its significant digits do.
fn parse_mantissa(number: &str) -> Result<Ratio<i128>, QuantityError> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let fraction = fraction.trim_end_matches('0');

    let whole = Ratio::from_integer(parse_digits(whole)?);
    if fraction.is_empty() {
        return Ok(whole);
    }
    let places = i32::try_from(fraction.len()).map_err(|_| QuantityError::Overflow)?;
    let fraction = Ratio::from_integer(parse_digits(fraction)?)
        .checked_mul(&pow10(-places)?)
        .ok_or(QuantityError::Overflow)?;
    whole.checked_add(&fraction).ok_or(QuantityError::Overflow)
}

/// ASCII digits as an integer; an empty string is zero.
fn parse_digits(digits: &str) -> Result<i128, QuantityError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => QuantityError::Overflow,
        _ => QuantityError::Malformed(digits.to_string()),
    })
}

/// Multiplier and format for a suffix, or `None` for an unknown suffix.
fn suffix_multiplier(suffix: &str) -> Option<(Ratio<i128>, QuantityFormat)> {
    if let Some(exponent) = suffix.strip_prefix(['e', 'E'])
        && !exponent.is_empty()
    {
        let exponent: i32 = exponent.parse().ok()?;
        if exponent.unsigned_abs() > MAX_EXPONENT {
            return None;
        }
        return Some((pow10(exponent).ok()?, QuantityFormat::DecimalExponent));
    }

    if let Some(&(_, power)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some((Ratio::from_integer(1i128 << power), QuantityFormat::BinarySI));
    }

    let scale = Scale::from_suffix(suffix)?;
    Some((pow10(scale.exponent()).ok()?, QuantityFormat::DecimalSI))
}

/// `10^exponent` as an exact fraction.
fn pow10(exponent: i32) -> Result<Ratio<i128>, QuantityError> {
    let power = 10i128
        .checked_pow(exponent.unsigned_abs())
        .ok_or(QuantityError::Overflow)?;
    if exponent >= 0 {
        Ok(Ratio::from_integer(power))
    } else {
        Ok(Ratio::new(1, power))
    }
}

/// Integer division rounding towards positive infinity.
fn ceil_div(numer: i128, denom: i128) -> i128 {
    let quotient = numer / denom;
    if numer % denom > 0 {
        quotient + 1
    } else {
        quotient
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_zero() {
            return f.write_str("0");
        }

        if self.format == QuantityFormat::BinarySI
            && let Some((mantissa, suffix)) = self.binary_form()
        {
            return write!(f, "{mantissa}{suffix}");
        }

        match self.decimal_form() {
            Some((mantissa, scale)) if self.format == QuantityFormat::DecimalExponent => {
                match scale.exponent() {
                    0 => write!(f, "{mantissa}"),
                    exponent => write!(f, "{mantissa}e{exponent}"),
                }
            }
            Some((mantissa, scale)) => write!(f, "{mantissa}{}", scale.suffix()),
            None => f.write_str(&self.plain_decimal()),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
