// Licensed under the Apache-2.0 license

//! Named invocation parameters

use crate::error::ParamError;
use crate::registry::HtoolParam;
use anyhow::{Context, Result};
use clap::ArgMatches;
use clap_num::maybe_hex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Named parameter lookup consumed by the operations
pub trait Invocation {
    fn get_param_string(&self, name: &str) -> Result<&str, ParamError>;

    /// Decimal or `0x`-prefixed hexadecimal
    fn get_param_u32(&self, name: &str) -> Result<u32, ParamError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParamValue {
    Integer(u32),
    Text(String),
}

impl ParamValue {
    fn into_string(self) -> String {
        match self {
            ParamValue::Integer(value) => value.to_string(),
            ParamValue::Text(value) => value,
        }
    }
}

/// Parameters held as strings and parsed on lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    values: BTreeMap<String, String>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Collect the values of `params` present in `matches`
    pub fn from_arg_matches(params: &[HtoolParam], matches: &ArgMatches) -> Self {
        let mut map = Self::new();
        for param in params {
            let value = match param {
                HtoolParam::String { name, .. } => matches.get_one::<String>(name).cloned(),
                HtoolParam::U32 { name, .. } => {
                    matches.get_one::<u32>(name).map(|v| v.to_string())
                }
            };
            if let Some(value) = value {
                map.set(param.name(), value);
            }
        }
        map
    }

    /// Load a flat TOML table of parameter names to strings or integers
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
        let values: BTreeMap<String, ParamValue> = toml::from_str(&content)
            .with_context(|| format!("Failed to parse parameter file: {}", path.display()))?;
        Ok(Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k, v.into_string()))
                .collect(),
        })
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Overlay `other`; its values win on conflicts
    pub fn merge(&mut self, other: ParamMap) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Invocation for ParamMap {
    fn get_param_string(&self, name: &str) -> Result<&str, ParamError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ParamError::Missing(name.to_string()))
    }

    fn get_param_u32(&self, name: &str) -> Result<u32, ParamError> {
        let value = self.get_param_string(name)?;
        maybe_hex::<u32>(value).map_err(|_| ParamError::Malformed {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}
