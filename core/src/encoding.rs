//! Byte encodings understood by the codepoint tokenizer and character-type
//! oracle.

use crate::error::CmaError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The byte encoding of the text an [`crate::analyzer::Analyzer`] is asked to
/// process. Fixed once per [`crate::knowledge::KnowledgeHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Gb2312,
    Big5,
    Gb18030,
    Utf8,
}

impl FromStr for Encoding {
    type Err = CmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gb2312" => Ok(Encoding::Gb2312),
            "big5" => Ok(Encoding::Big5),
            "gb18030" => Ok(Encoding::Gb18030),
            "utf8" => Ok(Encoding::Utf8),
            other => Err(CmaError::UnknownEncoding(other.to_string())),
        }
    }
}

impl Encoding {
    /// Number of bytes the codepoint starting at `bytes[0]` occupies.
    ///
    /// Never reads past `bytes.len()`; a truncated multi-byte sequence at the
    /// end of the buffer is clamped to the remaining length so the tokenizer
    /// still makes progress on malformed input.
    pub fn codepoint_len(self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        let lead = bytes[0];
        let want = match self {
            Encoding::Utf8 => utf8_len(lead),
            Encoding::Gb2312 | Encoding::Big5 => {
                if lead < 0x80 {
                    1
                } else {
                    2
                }
            }
            Encoding::Gb18030 => {
                if lead < 0x80 {
                    1
                } else if bytes.len() >= 2 && (0x30..=0x39).contains(&bytes[1]) {
                    4
                } else {
                    2
                }
            }
        };
        want.min(bytes.len())
    }
}

fn utf8_len(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        // Invalid lead byte under UTF-8; advance one byte so the tokenizer
        // can't get stuck.
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("gb2312".parse::<Encoding>().unwrap(), Encoding::Gb2312);
        assert!("latin1".parse::<Encoding>().is_err());
    }

    #[test]
    fn utf8_codepoint_len() {
        assert_eq!(Encoding::Utf8.codepoint_len(b"a"), 1);
        assert_eq!(Encoding::Utf8.codepoint_len("中".as_bytes()), 3);
    }

    #[test]
    fn gb18030_four_byte_extension() {
        let bytes = [0x81, 0x30, 0x81, 0x30];
        assert_eq!(Encoding::Gb18030.codepoint_len(&bytes), 4);
    }
}
