use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ON: &str = "on";
pub const OFF: &str = "off";
pub const DISABLED: &str = "disabled";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: ElementSettings,
    /// constant predicates available to php_function rules
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub predicates: BTreeMap<String, bool>,
}

/// whether rule checks run for an element at render time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnabledState {
    Disabled,
    Default,
    Enabled,
}

impl EnabledState {
    /// numeric form used by the host (-1 / 0 / 1)
    pub fn as_i8(&self) -> i8 {
        match self {
            EnabledState::Disabled => -1,
            EnabledState::Default => 0,
            EnabledState::Enabled => 1,
        }
    }
}

/// per-element switches, keyed by element base name
///
/// values are stored the way the settings page writes them: `on`, `off` or
/// `disabled`; anything else reads as the default state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSettings {
    /// element -> on | disabled
    #[serde(default)]
    pub enabled: BTreeMap<String, String>,
    /// element -> on | off (also strip hidden occurrences from raw content)
    #[serde(default)]
    pub advanced: BTreeMap<String, String>,
}

impl ElementSettings {
    /// settings for a fresh install: every known element on, none advanced
    pub fn initialize<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut settings = Self::default();
        for element in elements {
            let element = element.into();
            settings.enabled.insert(element.clone(), ON.to_string());
            settings.advanced.insert(element, OFF.to_string());
        }
        settings
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.advanced.is_empty()
    }

    pub fn enabled_state(&self, element: &str) -> EnabledState {
        match self.enabled.get(element).map(String::as_str) {
            Some(ON) => EnabledState::Enabled,
            Some(DISABLED) => EnabledState::Disabled,
            _ => EnabledState::Default,
        }
    }

    pub fn is_advanced(&self, element: &str) -> bool {
        self.advanced.get(element).map(String::as_str) == Some(ON)
    }

    /// elements whose hidden occurrences are stripped from raw content
    pub fn advanced_elements(&self) -> impl Iterator<Item = &str> {
        self.advanced
            .iter()
            .filter(|(_, value)| value.as_str() == ON)
            .map(|(element, _)| element.as_str())
    }

    pub fn set_element(&mut self, element: impl Into<String>, state: EnabledState) {
        let value = match state {
            EnabledState::Enabled => ON,
            EnabledState::Disabled => DISABLED,
            EnabledState::Default => OFF,
        };
        self.enabled.insert(element.into(), value.to_string());
    }

    pub fn set_advanced(&mut self, element: impl Into<String>, advanced: bool) {
        let value = if advanced { ON } else { OFF };
        self.advanced.insert(element.into(), value.to_string());
    }
}
