//! Serde helpers for VI/JSON payload quirks.

use serde::{Deserialize, Deserializer};

/// `xsd:byte[]` properties (such as `HostConfigInfo.certificate`) arrive either
/// as an array of signed bytes or as a base64 string depending on the server
/// build. Both decode to raw bytes.
pub mod byte_array {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Numbers(Vec<i16>),
        Encoded(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(Repr::Numbers(values)) => values
                .into_iter()
                .map(|v| match v {
                    -128..=-1 => Ok((v + 256) as u8),
                    0..=255 => Ok(v as u8),
                    _ => Err(serde::de::Error::custom(format!("byte out of range: {}", v))),
                })
                .collect(),
            Some(Repr::Encoded(text)) => STANDARD
                .decode(text.as_bytes())
                .map_err(|e| serde::de::Error::custom(format!("invalid base64: {}", e))),
        }
    }
}
