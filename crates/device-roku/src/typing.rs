//! Text entry: turning Unicode text into a series of `Lit_` keypresses.

use crate::client::{require_full_control, EcpClient};
use rokuecp_core::{Result, RokuDevice, RokuError, Transport};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Byte encoding used for each typed character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1, characters above U+00FF are skipped
    Latin1,
    /// Characters above U+007F are skipped
    Ascii,
}

impl TextEncoding {
    /// Bytes for `c`, or `None` when this encoding cannot represent it
    pub fn encode(&self, c: char) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => {
                let mut buf = [0u8; 4];
                Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
            }
            TextEncoding::Latin1 => u8::try_from(u32::from(c)).ok().map(|b| vec![b]),
            TextEncoding::Ascii => c.is_ascii().then(|| vec![c as u8]),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            other => Err(format!("unknown text encoding: {}", other)),
        }
    }
}

/// How failures of individual keypresses are reported by [`EcpClient::type_text`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypingPolicy {
    /// Send every character and report the result of the last keypress.
    /// Earlier failures are logged but not returned.
    #[default]
    LastWins,
    /// Stop at the first failed keypress and return its error
    FailFast,
}

/// Key name that types `c`, or `None` when `encoding` cannot represent it
pub fn literal_key(c: char, encoding: TextEncoding) -> Option<String> {
    encoding
        .encode(c)
        .map(|bytes| format!("Lit_{}", urlencoding::encode_binary(&bytes)))
}

impl<T: Transport> EcpClient<T> {
    /// Type `text` as UTF-8 keypresses, reporting the last keypress result
    pub fn type_text(&self, device: &RokuDevice, text: &str) -> Result<()> {
        self.type_text_with(device, text, TextEncoding::Utf8, TypingPolicy::LastWins)
    }

    /// Type `text` one character at a time
    ///
    /// Characters `encoding` cannot represent are skipped. Typing always stops
    /// as soon as the device reports that remote control is disabled.
    pub fn type_text_with(
        &self,
        device: &RokuDevice,
        text: &str,
        encoding: TextEncoding,
        policy: TypingPolicy,
    ) -> Result<()> {
        require_full_control(device)?;

        let mut last: Result<()> = Ok(());
        for c in text.chars() {
            let Some(key) = literal_key(c, encoding) else {
                tracing::debug!("Skipping {:?}: not representable in {:?}", c, encoding);
                continue;
            };

            last = match self.send_key(device, &key) {
                Ok(()) => Ok(()),
                Err(RokuError::Unauthorized) => return Err(RokuError::Unauthorized),
                Err(e) if policy == TypingPolicy::FailFast => {
                    tracing::warn!("Typing stopped at {}: {}", key, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Keypress {} failed: {}", key, e);
                    Err(e)
                }
            };
        }

        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_keys() {
        assert_eq!(literal_key('H', TextEncoding::Utf8).as_deref(), Some("Lit_H"));
        assert_eq!(literal_key('!', TextEncoding::Utf8).as_deref(), Some("Lit_%21"));
        assert_eq!(literal_key(' ', TextEncoding::Utf8).as_deref(), Some("Lit_%20"));
        assert_eq!(literal_key('~', TextEncoding::Utf8).as_deref(), Some("Lit_~"));
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(literal_key('é', TextEncoding::Utf8).as_deref(), Some("Lit_%C3%A9"));
        assert_eq!(literal_key('é', TextEncoding::Latin1).as_deref(), Some("Lit_%E9"));
        assert_eq!(literal_key('€', TextEncoding::Utf8).as_deref(), Some("Lit_%E2%82%AC"));
    }

    #[test]
    fn test_only_unreserved_bytes_stay_literal() {
        for c in ['-', '.', '_', '~', 'z', 'Z', '0'] {
            assert_eq!(literal_key(c, TextEncoding::Utf8), Some(format!("Lit_{}", c)));
        }
        assert_eq!(literal_key('&', TextEncoding::Utf8).as_deref(), Some("Lit_%26"));
        assert_eq!(literal_key('/', TextEncoding::Utf8).as_deref(), Some("Lit_%2F"));
        assert_eq!(literal_key('%', TextEncoding::Utf8).as_deref(), Some("Lit_%25"));
    }

    #[test]
    fn test_unrepresentable_characters() {
        assert_eq!(literal_key('€', TextEncoding::Latin1), None);
        assert_eq!(literal_key('é', TextEncoding::Ascii), None);
        assert_eq!(literal_key('a', TextEncoding::Ascii).as_deref(), Some("Lit_a"));
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("iso_8859_1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }
}
