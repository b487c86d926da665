//! Decoding of a single config document.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use super::ParseError;

/// The parsed content of one config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub variables: BTreeMap<String, String>,
    /// Include paths in listed order, relative to the file's directory.
    pub includes: Vec<String>,
}

/// Decodes raw file contents into a [`ConfigDocument`].
///
/// `path` is only a hint (e.g. for picking a format by extension); parsers
/// must not touch the filesystem.
pub trait ConfigParser: std::fmt::Debug {
    fn parse(&self, path: &Path, contents: &[u8]) -> Result<ConfigDocument, ParseError>;
}

/// Parses YAML documents, or TOML documents for files ending in `.toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatParser;

impl ConfigParser for FormatParser {
    fn parse(&self, path: &Path, contents: &[u8]) -> Result<ConfigDocument, ParseError> {
        let text = std::str::from_utf8(contents)?;
        if text.trim().is_empty() {
            return Ok(ConfigDocument::default());
        }

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let raw: RawDocument = if is_toml {
            toml::from_str(text)?
        } else {
            serde_yaml::from_str::<Option<RawDocument>>(text)?.unwrap_or_default()
        };

        Ok(raw.into())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    env_variables: Option<BTreeMap<String, Option<ScalarText>>>,
    #[serde(default)]
    includes: Option<Vec<String>>,
}

/// A variable value kept as the text it was written with.
///
/// YAML hands every scalar to a string visitor verbatim, so `1.10`, `0o755`
/// and `0x1F` survive unchanged. TOML only yields typed values, which are
/// rendered back with their display form. A null value is the empty string.
#[derive(Debug)]
struct ScalarText(String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_string(ScalarTextVisitor)
    }
}

struct ScalarTextVisitor;

impl<'de> Visitor<'de> for ScalarTextVisitor {
    type Value = ScalarText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ScalarText(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ScalarText(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ScalarText(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ScalarText(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ScalarText(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ScalarText(v.to_string()))
    }
}

impl From<RawDocument> for ConfigDocument {
    fn from(raw: RawDocument) -> Self {
        Self {
            variables: raw
                .env_variables
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (key, value.map(|text| text.0).unwrap_or_default()))
                .collect(),
            includes: raw.includes.unwrap_or_default(),
        }
    }
}
