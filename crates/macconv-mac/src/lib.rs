//! MAC address normalization and formatting
//!
//! Network gear disagrees on how a MAC address is written:
//! - `00:11:22:33:44:55` (Linux, most vendors)
//! - `0011.2233.4455` (Cisco)
//! - `0011-2233-4455` (H3C / Huawei)
//!
//! This crate accepts any of them, strips the separators and renders the
//! address in every common style.
//!
//! # Examples
//!
//! ```
//! use macconv_mac::{MacAddress, MacFormat};
//!
//! let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
//! assert_eq!(mac.format(MacFormat::COLON), "aa:bb:cc:dd:ee:ff");
//! assert_eq!(mac.format(MacFormat::DOT), "aabb.ccdd.eeff");
//! ```

use macconv_core::MacconvError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters removed during normalization
pub const SEPARATORS: [char; 3] = ['-', '.', ':'];

/// Number of hex digits in a MAC address
pub const HEX_DIGITS: usize = 12;

/// MAC address errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacError {
    /// Wrong number of characters after removing separators
    #[error("invalid MAC address {input:?}: expected 12 hex digits, got {len}")]
    Length { input: String, len: usize },

    /// Something other than a hex digit
    #[error("invalid MAC address {input:?}: unexpected character {found:?}")]
    InvalidCharacter { input: String, found: char },
}

impl From<MacError> for MacconvError {
    fn from(err: MacError) -> Self {
        MacconvError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MacError>;

/// Strip separators and lowercase
///
/// ```
/// use macconv_mac::normalize;
///
/// assert_eq!(normalize("0011.2233.4455"), "001122334455");
/// assert_eq!(normalize("AA:BB:CC:DD:EE:FF"), "aabbccddeeff");
/// ```
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Letter case of rendered hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterCase {
    Lower,
    Upper,
}

/// How to lay out the twelve hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacFormat {
    /// Digits per group
    pub group: usize,
    /// Separator placed between groups
    pub separator: char,
    pub case: LetterCase,
}

impl MacFormat {
    /// `00:11:22:33:44:55`
    pub const COLON: MacFormat = MacFormat::new(2, ':');
    /// `0011.2233.4455`
    pub const DOT: MacFormat = MacFormat::new(4, '.');
    /// `0011-2233-4455`
    pub const DASH: MacFormat = MacFormat::new(4, '-');

    /// Lower-case format with the given grouping
    pub const fn new(group: usize, separator: char) -> Self {
        Self {
            group,
            separator,
            case: LetterCase::Lower,
        }
    }

    /// Same layout, upper-case digits
    pub const fn upper(self) -> Self {
        Self {
            case: LetterCase::Upper,
            ..self
        }
    }

    fn style(&self) -> &'static str {
        match (self.separator, self.group) {
            (':', 2) => "colon",
            ('.', 4) => "dot",
            ('-', 4) => "dash",
            ('-', 2) => "dash-pairs",
            _ => "custom",
        }
    }
}

/// One rendering of a MAC address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendering {
    pub style: &'static str,
    pub case: LetterCase,
    pub value: String,
}

/// A validated 48-bit MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Parse a MAC address in any separator style
    ///
    /// # Examples
    ///
    /// ```
    /// use macconv_mac::MacAddress;
    ///
    /// assert!(MacAddress::parse("00-11-22-33-44-55").is_ok());
    /// assert!(MacAddress::parse("00:11:22:33:44:GG").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let digits = normalize(input);

        let len = digits.chars().count();
        if len != HEX_DIGITS {
            return Err(MacError::Length {
                input: input.to_string(),
                len,
            });
        }

        if let Some(found) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(MacError::InvalidCharacter {
                input: input.to_string(),
                found,
            });
        }

        let mut octets = [0u8; 6];
        for (octet, pair) in octets.iter_mut().zip(digits.as_bytes().chunks(2)) {
            *octet = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }

        tracing::debug!(input, normalized = %digits, "parsed MAC address");
        Ok(Self(octets))
    }

    /// Raw bytes
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// The twelve hex digits with no separators
    pub fn hex(&self, case: LetterCase) -> String {
        self.0
            .iter()
            .map(|b| match case {
                LetterCase::Lower => format!("{:02x}", b),
                LetterCase::Upper => format!("{:02X}", b),
            })
            .collect()
    }

    /// Render using the given layout
    pub fn format(&self, format: MacFormat) -> String {
        let group = format.group.max(1);
        let digits = self.hex(format.case);
        let mut out = String::with_capacity(HEX_DIGITS + HEX_DIGITS / group);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && i % group == 0 {
                out.push(format.separator);
            }
            out.push(c);
        }
        out
    }

    /// Colon, dot and dash layouts, lower case first, then upper case
    pub fn renderings(&self) -> Vec<Rendering> {
        let layouts = [MacFormat::COLON, MacFormat::DOT, MacFormat::DASH];
        layouts
            .iter()
            .copied()
            .chain(layouts.iter().map(|f| f.upper()))
            .map(|f| Rendering {
                style: f.style(),
                case: f.case,
                value: self.format(f),
            })
            .collect()
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

impl FromStr for MacAddress {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(MacFormat::COLON))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let cases = [
            ("00:11:22:33:44:55", "001122334455"),
            ("00-11-22-33-44-55", "001122334455"),
            ("0011.2233.4455", "001122334455"),
            ("001122334455", "001122334455"),
            ("AA:BB:CC:DD:EE:FF", "aabbccddeeff"),
            ("aa-bb-cc-dd-ee-ff", "aabbccddeeff"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_any_style() {
        let expected = MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        for input in ["00:11:22:33:44:55", "0011.2233.4455", "0011-2233-4455", "001122334455"] {
            assert_eq!(MacAddress::parse(input).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_too_short() {
        let err = MacAddress::parse("00112233445").unwrap_err();
        assert_eq!(
            err,
            MacError::Length {
                input: "00112233445".to_string(),
                len: 11
            }
        );
    }

    #[test]
    fn test_parse_invalid_character() {
        let err = MacAddress::parse("00:11:22:33:44:GG").unwrap_err();
        assert_eq!(
            err,
            MacError::InvalidCharacter {
                input: "00:11:22:33:44:GG".to_string(),
                found: 'g'
            }
        );
    }

    #[test]
    fn test_parse_rejects_other_separators() {
        assert!(MacAddress::parse("00 11 22 33 44 55").is_err());
        assert!(MacAddress::parse("").is_err());
        assert!(MacAddress::parse("00:11:22:33:44:55:66").is_err());
    }

    #[test]
    fn test_format_layouts() {
        let mac = MacAddress::parse("001122334455").unwrap();
        assert_eq!(mac.format(MacFormat::COLON), "00:11:22:33:44:55");
        assert_eq!(mac.format(MacFormat::DOT), "0011.2233.4455");
        assert_eq!(mac.format(MacFormat::DASH), "0011-2233-4455");
        assert_eq!(mac.format(MacFormat::new(2, '-')), "00-11-22-33-44-55");
    }

    #[test]
    fn test_format_upper() {
        let mac = MacAddress::parse("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(mac.format(MacFormat::COLON.upper()), "AA:BB:CC:DD:EE:FF");
        assert_eq!(mac.format(MacFormat::DOT.upper()), "AABB.CCDD.EEFF");
        assert_eq!(mac.hex(LetterCase::Lower), "aabbccddeeff");
    }

    #[test]
    fn test_renderings() {
        let mac = MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap();
        let values: Vec<String> = mac.renderings().into_iter().map(|r| r.value).collect();
        assert_eq!(
            values,
            vec![
                "aa:bb:cc:dd:ee:ff",
                "aabb.ccdd.eeff",
                "aabb-ccdd-eeff",
                "AA:BB:CC:DD:EE:FF",
                "AABB.CCDD.EEFF",
                "AABB-CCDD-EEFF",
            ]
        );
    }

    #[test]
    fn test_display_and_from_str() {
        let mac: MacAddress = "0011.2233.44ff".parse().unwrap();
        assert_eq!(mac.to_string(), "00:11:22:33:44:ff");
        assert_eq!(mac.octets()[5], 0xff);
    }

    #[test]
    fn test_serialization() {
        let mac = MacAddress::parse("0011-2233-4455").unwrap();
        let json = serde_json::to_string(&mac).expect("serialization failed");
        assert_eq!(json, "\"00:11:22:33:44:55\"");

        let json = serde_json::to_value(&mac.renderings()[3]).expect("serialization failed");
        assert_eq!(json["style"], "colon");
        assert_eq!(json["case"], "upper");
    }

    #[test]
    fn test_into_macconv_error() {
        let err: MacconvError = MacAddress::parse("xyz").unwrap_err().into();
        assert_eq!(err.kind(), macconv_core::ErrorKind::Validation);
    }
}
