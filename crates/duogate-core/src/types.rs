use crate::{Result, constants::MAX_CARD_CODE_LENGTH, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Passage direction through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Tag sent to the authorization backend.
    #[inline]
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    /// The other direction.
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    /// Both directions, inbound first.
    pub const ALL: [Direction; 2] = [Direction::In, Direction::Out];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// Card code read from a barcode scanner (1-64 ASCII digits).
///
/// # Security
/// Comparison is constant-time, since codes act as credentials.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardCode(String);

impl CardCode {
    /// Create a card code with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardCode` if the code is empty, longer than
    /// [`MAX_CARD_CODE_LENGTH`] or contains anything but ASCII digits.
    pub fn new(code: &str) -> Result<Self> {
        if code.is_empty() {
            return Err(Error::InvalidCardCode("code is empty".to_string()));
        }

        let len = code.len();
        if len > MAX_CARD_CODE_LENGTH {
            return Err(Error::InvalidCardCode(format!(
                "code must be at most {MAX_CARD_CODE_LENGTH} digits, got {len}"
            )));
        }

        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCardCode(format!(
                "code must contain only digits: {code:?}"
            )));
        }

        Ok(CardCode(code.to_string()))
    }

    /// Build a code from raw scanner bytes, keeping only ASCII digits.
    ///
    /// Returns `None` when the bytes hold no digit at all (an empty swipe).
    ///
    /// # Examples
    ///
    /// ```
    /// use duogate_core::CardCode;
    ///
    /// let code = CardCode::from_raw(b"\x021234\r\n").unwrap();
    /// assert_eq!(code.as_str(), "1234");
    ///
    /// assert!(CardCode::from_raw(b"\x02\x03").is_none());
    /// ```
    #[must_use]
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        let digits: String = raw
            .iter()
            .filter(|b| b.is_ascii_digit())
            .take(MAX_CARD_CODE_LENGTH)
            .map(|&b| char::from(b))
            .collect();

        if digits.is_empty() {
            None
        } else {
            Some(CardCode(digits))
        }
    }

    /// Get the card code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardCode::new(s)
    }
}

impl TryFrom<String> for CardCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        CardCode::new(&value)
    }
}

impl From<CardCode> for String {
    fn from(code: CardCode) -> Self {
        code.0
    }
}

impl PartialEq for CardCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for CardCode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_direction_tags() {
        assert_eq!(Direction::In.tag(), "in");
        assert_eq!(Direction::Out.tag(), "out");
        assert_eq!(Direction::In.to_string(), "in");
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::In.opposite(), Direction::Out);
        assert_eq!(Direction::Out.opposite(), Direction::In);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("in".parse::<Direction>().unwrap(), Direction::In);
        assert_eq!("out".parse::<Direction>().unwrap(), Direction::Out);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::Out).unwrap();
        assert_eq!(json, "\"out\"");
    }

    #[rstest]
    #[case("1234")]
    #[case("0")]
    #[case("000123456789")]
    fn test_card_code_valid(#[case] input: &str) {
        let code = CardCode::new(input).unwrap();
        assert_eq!(code.as_str(), input);
    }

    #[rstest]
    #[case("")]
    #[case("12a4")]
    #[case(" 1234")]
    #[case("١٢٣")]
    fn test_card_code_invalid(#[case] input: &str) {
        assert!(CardCode::new(input).is_err());
    }

    #[test]
    fn test_card_code_too_long() {
        let input = "9".repeat(MAX_CARD_CODE_LENGTH + 1);
        assert!(CardCode::new(&input).is_err());
    }

    #[rstest]
    #[case(b"\x021234\x03".as_slice(), "1234")]
    #[case(b"1234".as_slice(), "1234")]
    #[case(b"\x1b[12;34".as_slice(), "1234")]
    #[case(b"\r\n5\t6\r\n".as_slice(), "56")]
    fn test_card_code_from_raw(#[case] raw: &[u8], #[case] expected: &str) {
        assert_eq!(CardCode::from_raw(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn test_card_code_from_raw_without_digits() {
        assert!(CardCode::from_raw(b"").is_none());
        assert!(CardCode::from_raw(b"\x02\x03\r\n").is_none());
    }

    #[test]
    fn test_card_code_equality() {
        let a = CardCode::new("1234").unwrap();
        let b = CardCode::new("1234").unwrap();
        let c = CardCode::new("12345").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_card_code_serde_validates() {
        let code: CardCode = serde_json::from_str("\"4321\"").unwrap();
        assert_eq!(code.as_str(), "4321");
        assert!(serde_json::from_str::<CardCode>("\"43x1\"").is_err());
    }
}
