//! request context assembled from command-line flags

use std::collections::HashMap;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, ValueEnum};
use thiserror::Error;

use crate::conditions::{EvalContext, PredicateRegistry, User};
use crate::device::{DeviceClass, DeviceDetector, UserAgentDetector};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextError {
    #[error("invalid --query '{0}': expected name=value")]
    InvalidQuery(String),

    #[error("invalid --now '{0}': expected YYYY-MM-DD HH:MM[:SS] or YYYY/MM/DD HH:MM[:SS]")]
    InvalidTime(String),

    #[error("invalid --predicate '{0}': expected name or name=true|false")]
    InvalidPredicate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceArg {
    Desktop,
    Phone,
    Tablet,
}

impl From<DeviceArg> for DeviceClass {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Desktop => DeviceClass::DESKTOP,
            DeviceArg::Phone => DeviceClass::PHONE,
            DeviceArg::Tablet => DeviceClass::TABLET,
        }
    }
}

/// flags describing the request a rule is evaluated for
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Id of the logged-in user (omit or 0 for an anonymous visitor)
    #[arg(long)]
    pub user_id: Option<u64>,

    /// Role of the logged-in user (repeatable)
    #[arg(long = "role", requires = "user_id")]
    pub roles: Vec<String>,

    /// Query parameter as name=value (repeatable, overrides --url)
    #[arg(long = "query")]
    pub query: Vec<String>,

    /// Request URL whose query string supplies parameters
    #[arg(long)]
    pub url: Option<String>,

    /// Evaluation time (default: now, local time)
    #[arg(long)]
    pub now: Option<String>,

    /// Requesting device class
    #[arg(long, value_enum, conflicts_with = "user_agent")]
    pub device: Option<DeviceArg>,

    /// Classify the requesting device from a User-Agent string
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Host predicate for php_function rules as name[=true|false] (repeatable)
    #[arg(long = "predicate")]
    pub predicates: Vec<String>,
}

impl ContextArgs {
    pub fn build(&self) -> Result<EvalContext, ContextError> {
        let now = match &self.now {
            Some(s) => parse_now(s)?,
            None => Local::now().naive_local(),
        };

        let user = self
            .user_id
            .filter(|id| *id != 0)
            .map(|id| User::new(id).with_roles(self.roles.iter().cloned()));

        let mut query = self.url.as_deref().map(parse_query_string).unwrap_or_default();
        for pair in &self.query {
            let (name, value) = pair
                .split_once('=')
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| ContextError::InvalidQuery(pair.clone()))?;
            query.insert(name.to_string(), value.to_string());
        }

        let device = match (&self.device, &self.user_agent) {
            (Some(device), _) => DeviceClass::from(*device),
            (None, Some(ua)) => UserAgentDetector.classify(ua),
            (None, None) => DeviceClass::DESKTOP,
        };

        Ok(EvalContext::new(now)
            .with_user(user)
            .with_query(query)
            .with_device(device))
    }

    /// `--predicate` flags layered over `base`
    pub fn predicates(&self, mut base: PredicateRegistry) -> Result<PredicateRegistry, ContextError> {
        for flag in &self.predicates {
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => {
                    let value = match value.to_lowercase().as_str() {
                        "true" | "1" | "yes" | "on" => true,
                        "false" | "0" | "no" | "off" => false,
                        _ => return Err(ContextError::InvalidPredicate(flag.clone())),
                    };
                    (name, value)
                }
                None => (flag.as_str(), true),
            };
            if name.is_empty() {
                return Err(ContextError::InvalidPredicate(flag.clone()));
            }
            base.register_constant(name, value);
        }
        Ok(base)
    }
}

fn parse_now(s: &str) -> Result<NaiveDateTime, ContextError> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];

    let s = s.trim();
    if let Some(dt) = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt);
    }

    // a bare date means midnight
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ContextError::InvalidTime(s.to_string()))
}

/// query parameters of a URL; later duplicates win
pub fn parse_query_string(url: &str) -> HashMap<String, String> {
    let Some((_, query)) = url.split_once('?') else {
        return HashMap::new();
    };
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode_component(name);
            (!name.is_empty()).then(|| (name, decode_component(value)))
        })
        .collect()
}

fn decode_component(s: &str) -> String {
    let s = s.replace('+', " ");
    urlencoding::decode(&s)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(s)
}
