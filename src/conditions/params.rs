//! URL-parameter payloads for url_parameters rules
//!
//! the element editor stores the list of expected query parameters as
//! `base64(rawurlencode(JSON([{"name": .., "value": ..}, ..])))`.

use std::collections::HashMap;

use base64::{engine::general_purpose, Engine as _};
use log::warn;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// one expected query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParam {
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub value: Option<String>,
}

/// strings as-is, numbers in their decimal form, booleans as "1" / ""
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(if b { "1" } else { "" }.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a scalar parameter field, found {}",
            other
        ))),
    }
}

impl UrlParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }

    /// parse a `name=value` pair (value may be empty, `=` may be omitted)
    pub fn parse_pair(s: &str) -> Self {
        match s.split_once('=') {
            Some((name, value)) => Self::new(name, value),
            None => Self::new(s, ""),
        }
    }

    /// whether the request carries this parameter with the expected value
    ///
    /// the request value is trimmed and compared ASCII case-insensitively
    pub fn matches(&self, query: &HashMap<String, String>) -> bool {
        let Some(name) = self.name.as_deref() else {
            return false;
        };
        let expected = self.value.as_deref().unwrap_or_default();

        query
            .get(name)
            .is_some_and(|actual| actual.trim().eq_ignore_ascii_case(expected))
    }
}

/// how multiple parameters combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamCondition {
    /// every named parameter must match
    #[default]
    All,
    /// one matching parameter is enough
    Any,
}

impl ParamCondition {
    /// "or" (any case, surrounding whitespace ignored) selects `Any`, anything else `All`
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("or") {
            ParamCondition::Any
        } else {
            ParamCondition::All
        }
    }
}

/// encode parameters the way the element editor does
pub fn encode_url_params(params: &[UrlParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    // serializing plain strings cannot fail
    let json = serde_json::to_string(params).unwrap_or_else(|_| "[]".to_string());
    general_purpose::STANDARD.encode(urlencoding::encode(&json).as_bytes())
}

/// decode an editor payload; malformed payloads decode to an empty list
pub fn decode_url_params(payload: &str) -> Vec<UrlParam> {
    let payload = payload.trim();
    if payload.is_empty() {
        return vec![];
    }

    let Some(bytes) = decode_base64(payload) else {
        warn!("url_params payload is not valid base64: {}", payload);
        return vec![];
    };

    let encoded = String::from_utf8_lossy(&bytes);
    let json = match urlencoding::decode(&encoded) {
        Ok(json) => json,
        Err(e) => {
            warn!("url_params payload is not valid percent-encoding: {}", e);
            return vec![];
        }
    };

    match serde_json::from_str::<Vec<UrlParam>>(&json) {
        Ok(params) => params,
        Err(e) => {
            warn!("url_params payload is not a parameter list: {}", e);
            vec![]
        }
    }
}

/// base64 with or without padding, ignoring embedded whitespace
fn decode_base64(payload: &str) -> Option<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    general_purpose::STANDARD
        .decode(&compact)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(compact.trim_end_matches('=')))
        .ok()
}
