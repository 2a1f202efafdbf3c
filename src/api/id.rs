//! Resource identifiers
//!
//! Eventline identifies every resource with a KSUID: 20 bytes (a 4-byte
//! timestamp followed by 16 random bytes) rendered as 27 base62 characters.
//! The fixed width keeps the string form lexicographically sortable in
//! creation order.

use super::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const ENCODED_LEN: usize = 27;
const RAW_LEN: usize = 20;

/// KSUID timestamps count seconds from this point instead of the Unix epoch
const EPOCH_OFFSET: i64 = 1_400_000_000;

/// Validated resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; RAW_LEN]);

impl Id {
    pub fn from_bytes(bytes: [u8; RAW_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.0
    }

    /// Parse and validate an identifier string
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != ENCODED_LEN {
            return Err(malformed());
        }
        decode_base62(s.as_bytes()).map(Self).ok_or_else(malformed)
    }

    /// Creation time embedded in the identifier
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs) + EPOCH_OFFSET, 0)
    }
}

fn malformed() -> Error {
    Error::validation("malformed identifier")
}

fn digit_value(c: u8) -> Option<u32> {
    match c {
        b'0'..=b'9' => Some(u32::from(c - b'0')),
        b'A'..=b'Z' => Some(u32::from(c - b'A') + 10),
        b'a'..=b'z' => Some(u32::from(c - b'a') + 36),
        _ => None,
    }
}

fn decode_base62(input: &[u8]) -> Option<[u8; RAW_LEN]> {
    let mut out = [0u8; RAW_LEN];

    for &c in input {
        let mut carry = digit_value(c)?;
        for byte in out.iter_mut().rev() {
            let v = u32::from(*byte) * 62 + carry;
            *byte = (v & 0xff) as u8;
            carry = v >> 8;
        }
        // Value does not fit in 160 bits
        if carry != 0 {
            return None;
        }
    }

    Some(out)
}

fn encode_base62(bytes: &[u8; RAW_LEN]) -> String {
    let mut num = *bytes;
    let mut out = [b'0'; ENCODED_LEN];

    for slot in out.iter_mut().rev() {
        let mut rem = 0u32;
        for byte in num.iter_mut() {
            let v = (rem << 8) | u32::from(*byte);
            *byte = (v / 62) as u8;
            rem = v % 62;
        }
        *slot = ALPHABET[rem as usize];
    }

    out.iter().map(|&b| b as char).collect()
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_base62(&self.0))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::parse(&s).map_err(|_| de::Error::custom(format!("malformed identifier {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0ujtsYcgvSTl8PAuAdqWYSMnLOv";

    #[test]
    fn test_parse_valid_identifier() {
        let id = Id::parse(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        for s in ["", "0ujtsYcgvSTl8PAuAdqWYSMnLO", "0ujtsYcgvSTl8PAuAdqWYSMnLOvv"] {
            let err = Id::parse(s).unwrap_err();
            assert_eq!(err.to_string(), "malformed identifier");
        }
    }

    #[test]
    fn test_parse_rejects_characters_outside_alphabet() {
        assert!(Id::parse("0ujtsYcgvSTl8PAuAdqWYSMnLO-").is_err());
        assert!(Id::parse("0ujtsYcgvSTl8PAu/dqWYSMnLOv").is_err());
        assert!(Id::parse("0ujtsYcgvSTl8PAuAdqWYSMnLOé").is_err());
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(Id::parse("aWgEPTl1tmebfsQzFP4bxwgy80V").is_ok());
        assert!(Id::parse("aWgEPTl1tmebfsQzFP4bxwgy80W").is_err());
        assert!(Id::parse("zzzzzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_extreme_values_encode_at_full_width() {
        assert_eq!(Id::from_bytes([0; 20]).to_string(), "000000000000000000000000000");
        assert_eq!(
            Id::from_bytes([0xff; 20]).to_string(),
            "aWgEPTl1tmebfsQzFP4bxwgy80V"
        );
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let mut low = [0u8; 20];
        low[3] = 1;
        let mut high = [0u8; 20];
        high[2] = 1;

        let (low, high) = (Id::from_bytes(low), Id::from_bytes(high));
        assert!(low < high);
        assert!(low.to_string() < high.to_string());
    }

    #[test]
    fn test_timestamp_uses_ksuid_epoch() {
        let ts = Id::from_bytes([0; 20]).timestamp().unwrap();
        assert_eq!(ts.timestamp(), EPOCH_OFFSET);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = Id::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE));

        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<Id>("\"not-an-id\"").is_err());
    }
}
