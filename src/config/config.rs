use std::borrow::Cow;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::sync::CompareMode;

const COMPARE_KEY: &str = "compare";
const DELETE_KEY: &str = "delete";

/// Settings read from a YAML file. Anything left out falls back to the
/// command line or the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub compare: Option<CompareMode>,
    pub delete: Option<bool>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading config file: {}", path.best_effort_path_display());
        let contents = fs::read_to_string(path).context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read config file: {} bytes", contents.len());
        contents.as_str().try_into()
    }

    fn parse_compare(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Option<CompareMode>, ConfigError> {
        let Some(value) = top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(COMPARE_KEY)))) else {
            return Ok(None);
        };
        let name = value.as_str().context(InvalidValueSnafu {
            key: COMPARE_KEY,
            expected: "a string",
        })?;
        CompareMode::from_str(name, true)
            .map(Some)
            .map_err(|_| ConfigError::UnknownCompareMode { value: name.to_string() })
    }

    fn parse_delete(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Option<bool>, ConfigError> {
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(DELETE_KEY)))) {
            None => Ok(None),
            Some(Yaml::Value(Scalar::Boolean(delete))) => Ok(Some(*delete)),
            Some(_) => InvalidValueSnafu {
                key: DELETE_KEY,
                expected: "true or false",
            }
            .fail(),
        }
    }
}

impl TryFrom<&str> for Config {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        // An empty file configures nothing
        let Some(document) = documents.first() else {
            return Ok(Config::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        for key in top_level.keys() {
            match key.as_str() {
                Some(COMPARE_KEY | DELETE_KEY) => {}
                _ => debug!("Ignoring unknown config key: {:?}", key),
            }
        }

        Ok(Config {
            compare: Self::parse_compare(top_level)?,
            delete: Self::parse_delete(top_level)?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be {}", key, expected))]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },
    #[snafu(display(
        "Unknown comparison '{}', expected size-only, size-and-time or checksum",
        value
    ))]
    UnknownCompareMode { value: String },
}
