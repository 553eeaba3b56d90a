//! core types for the show-for rule system

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// attribute that selects the rule kind
pub const SHOWFOR: &str = "showfor";

/// the fixed set of rule kinds an element can carry in its `showfor` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowFor {
    /// no rule: visible to everyone unless the fallback hook says otherwise
    Everyone,
    NotLoggedIn,
    LoggedIn,
    SelectedUserRoles,
    SelectedUsers,
    DiscardedUsers,
    SelectedDevices,
    DateRange,
    TimeRange,
    DayOfWeek,
    UrlParameters,
    /// named predicate lookup
    PhpFunction,
}

impl ShowFor {
    pub const ALL: [ShowFor; 12] = [
        ShowFor::Everyone,
        ShowFor::NotLoggedIn,
        ShowFor::LoggedIn,
        ShowFor::SelectedUserRoles,
        ShowFor::SelectedUsers,
        ShowFor::DiscardedUsers,
        ShowFor::SelectedDevices,
        ShowFor::DateRange,
        ShowFor::TimeRange,
        ShowFor::DayOfWeek,
        ShowFor::UrlParameters,
        ShowFor::PhpFunction,
    ];

    /// parse a `showfor` attribute value (exact, case-sensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "none" => Some(ShowFor::Everyone),
            "not_logged_in" => Some(ShowFor::NotLoggedIn),
            "logged_in" => Some(ShowFor::LoggedIn),
            "selected_user_roles" => Some(ShowFor::SelectedUserRoles),
            "selected_users" => Some(ShowFor::SelectedUsers),
            "discarded_users" => Some(ShowFor::DiscardedUsers),
            "selected_devices" => Some(ShowFor::SelectedDevices),
            "date_range" => Some(ShowFor::DateRange),
            "time_range" => Some(ShowFor::TimeRange),
            "day_of_week" => Some(ShowFor::DayOfWeek),
            "url_parameters" => Some(ShowFor::UrlParameters),
            "php_function" => Some(ShowFor::PhpFunction),
            _ => None,
        }
    }

    /// attribute value for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowFor::Everyone => "none",
            ShowFor::NotLoggedIn => "not_logged_in",
            ShowFor::LoggedIn => "logged_in",
            ShowFor::SelectedUserRoles => "selected_user_roles",
            ShowFor::SelectedUsers => "selected_users",
            ShowFor::DiscardedUsers => "discarded_users",
            ShowFor::SelectedDevices => "selected_devices",
            ShowFor::DateRange => "date_range",
            ShowFor::TimeRange => "time_range",
            ShowFor::DayOfWeek => "day_of_week",
            ShowFor::UrlParameters => "url_parameters",
            ShowFor::PhpFunction => "php_function",
        }
    }

    /// human-readable label, as shown in the element editor
    pub fn label(&self) -> &'static str {
        match self {
            ShowFor::Everyone => "Everyone",
            ShowFor::NotLoggedIn => "Not Logged In Users",
            ShowFor::LoggedIn => "All Members",
            ShowFor::SelectedUserRoles => "Members with Selected User Roles",
            ShowFor::SelectedUsers => "Selected Users",
            ShowFor::DiscardedUsers => "Discarded Users",
            ShowFor::SelectedDevices => "Selected Devices",
            ShowFor::DateRange => "Date Range",
            ShowFor::TimeRange => "Time Range",
            ShowFor::DayOfWeek => "Day Of Week",
            ShowFor::UrlParameters => "URL Parameters",
            ShowFor::PhpFunction => "PHP Function",
        }
    }

    /// closest known kind for a misspelled value, if any is close enough
    pub fn suggest(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        ShowFor::ALL
            .iter()
            .filter(|kind| **kind != ShowFor::Everyone)
            .map(|kind| (*kind, strsim::levenshtein(&value, kind.as_str())))
            .filter(|(_, distance)| *distance <= 3)
            .min_by_key(|(_, distance)| *distance)
            .map(|(kind, _)| kind)
    }
}

impl fmt::Display for ShowFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// attribute bag attached to one element occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(BTreeMap<String, String>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// raw attribute value (present, possibly empty)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// attribute value only when present and non-empty
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// attribute split on commas with each item trimmed
    pub fn list(&self, key: &str) -> Option<Vec<&str>> {
        self.get(key).map(|v| v.split(',').map(str::trim).collect())
    }

    /// the rule kind, `None` when the value is unknown
    pub fn kind(&self) -> Option<ShowFor> {
        ShowFor::parse(self.get(SHOWFOR).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}=\"{}\"", key, value)?;
        }
        Ok(())
    }
}

/// the authenticated user a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: u64) -> Self {
        Self { id, roles: vec![] }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}
