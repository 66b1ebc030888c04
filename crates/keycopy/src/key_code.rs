//! Bitting code: one depth digit per cylinder.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Error;

/// Allowed depth digits of a key blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DepthLevels {
    /// Lowest digit (0 or 1 on common blanks).
    pub first: u8,
    /// Number of digits.
    pub count: u8,
}

impl DepthLevels {
    /// Extra depth step applied when numbering starts at 0.
    pub fn adjustment(&self) -> u8 {
        u8::from(self.first == 0)
    }

    /// Highest allowed digit.
    pub fn last(&self) -> u8 {
        self.first + self.count.saturating_sub(1)
    }

    pub fn digits(&self) -> RangeInclusive<u8> {
        self.first..=self.last()
    }

    pub fn contains(&self, digit: u8) -> bool {
        self.digits().contains(&digit)
    }

    /// Depth below the uncut blade top for `digit`, in profile units.
    pub fn root_depth(&self, digit: u8, depth_spacing: f64) -> f64 {
        f64::from(self.adjustment() + digit) * depth_spacing
    }
}

/// Ordered depth digits, rendered as a concatenated decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCode {
    digits: Vec<u8>,
}

impl KeyCode {
    /// Longest code accepted.
    pub const MAX_LEN: usize = 20;

    pub fn from_digits(digits: Vec<u8>) -> Result<Self, Error> {
        if digits.is_empty() {
            return Err(Error::validation("key_code", "must not be empty"));
        }
        if digits.len() > Self::MAX_LEN {
            return Err(Error::validation(
                "key_code",
                format!("{} digits exceeds the {} digit limit", digits.len(), Self::MAX_LEN),
            ));
        }
        if let Some(d) = digits.iter().find(|&&d| d > 9) {
            return Err(Error::validation(
                "key_code",
                format!("{} is not a decimal digit", d),
            ));
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Decimal value of the concatenated digits (leading zeros drop out).
    pub fn numeric_value(&self) -> u128 {
        self.digits
            .iter()
            .fold(0u128, |acc, &d| acc * 10 + u128::from(d))
    }

    /// Check length against the cylinder count and every digit against the
    /// allowed depth levels.
    pub fn check_against(&self, levels: DepthLevels, cylinder_count: usize) -> Result<(), Error> {
        if self.digits.len() != cylinder_count {
            return Err(Error::CodeLengthMismatch {
                expected: cylinder_count,
                got: self.digits.len(),
            });
        }
        for (position, &digit) in self.digits.iter().enumerate() {
            if !levels.contains(digit) {
                return Err(Error::DigitOutOfRange {
                    position,
                    digit,
                    min: levels.first,
                    max: levels.last(),
                });
            }
        }
        Ok(())
    }

    /// First adjacent pair whose depth difference exceeds `limit`.
    pub fn macs_violation(&self, limit: u8) -> Option<(u8, u8)> {
        self.digits
            .windows(2)
            .find(|w| w[0].abs_diff(w[1]) > limit)
            .map(|w| (w[0], w[1]))
    }
}

impl FromStr for KeyCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
            return Err(Error::validation(
                "key_code",
                format!("'{}' is not a decimal digit", c),
            ));
        }
        Self::from_digits(s.bytes().map(|b| b - b'0').collect())
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl serde::Serialize for KeyCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_digits() {
        let code: KeyCode = "03152".parse().expect("valid code");
        assert_eq!(code.digits(), &[0, 3, 1, 5, 2]);
        assert_eq!(code.to_string(), "03152");
        assert_eq!(code.numeric_value(), 3152);
    }

    #[test]
    fn rejects_non_digits_and_overlong_codes() {
        assert!("12a45".parse::<KeyCode>().is_err());
        assert!("".parse::<KeyCode>().is_err());
        assert!("1".repeat(21).parse::<KeyCode>().is_err());
        assert!("9".repeat(20).parse::<KeyCode>().is_ok());
    }

    #[test]
    fn twenty_nines_fit_in_numeric_value() {
        let code: KeyCode = "9".repeat(20).parse().expect("valid");
        assert_eq!(code.numeric_value(), 99_999_999_999_999_999_999u128);
    }

    #[test]
    fn levels_starting_at_zero_add_one_step() {
        let zero_based = DepthLevels { first: 0, count: 10 };
        assert_eq!(zero_based.adjustment(), 1);
        assert_eq!(zero_based.digits(), 0..=9);
        assert_eq!(zero_based.root_depth(0, 0.5), 0.5);

        let one_based = DepthLevels { first: 1, count: 7 };
        assert_eq!(one_based.adjustment(), 0);
        assert_eq!(one_based.last(), 7);
        assert!(!one_based.contains(0));
    }

    #[test]
    fn check_against_reports_position_and_length() {
        let levels = DepthLevels { first: 1, count: 7 };
        let code: KeyCode = "12803".parse().expect("valid");
        assert_eq!(
            code.check_against(levels, 5),
            Err(Error::DigitOutOfRange {
                position: 2,
                digit: 8,
                min: 1,
                max: 7
            })
        );
        assert_eq!(
            code.check_against(levels, 6),
            Err(Error::CodeLengthMismatch {
                expected: 6,
                got: 5
            })
        );
    }

    #[test]
    fn macs_finds_first_offending_pair() {
        let code: KeyCode = "91".parse().expect("valid");
        assert_eq!(code.macs_violation(4), Some((9, 1)));
        let ok: KeyCode = "56".parse().expect("valid");
        assert_eq!(ok.macs_violation(4), None);
    }
}
