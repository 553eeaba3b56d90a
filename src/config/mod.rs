mod schema;

pub use schema::{Config, ElementSettings, EnabledState, DISABLED, OFF, ON};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::conditions::PredicateRegistry;

const CONFIG_ENV_VAR: &str = "SHOWFOR_CONFIG";

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(expand_path(&path));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".showfor")
        .join("config.json"))
}

/// `--config` wins over the environment and the default location
pub fn get_config_path_with_override(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(expand_path(&path.to_string_lossy())),
        None => get_config_path(),
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// load settings; a missing file yields the defaults
pub fn load_with_override(path: Option<&Path>) -> Result<Config> {
    let path = get_config_path_with_override(path)?;
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

pub fn save_with_override(config: &Config, path: Option<&Path>) -> Result<PathBuf> {
    let path = get_config_path_with_override(path)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(path)
}

/// constant predicates declared in the config, ready for php_function rules
pub fn predicate_registry(config: &Config) -> PredicateRegistry {
    let mut registry = PredicateRegistry::new();
    for (name, value) in &config.predicates {
        registry.register_constant(name.clone(), *value);
    }
    registry
}

/// Verify configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    let mut errors = Vec::new();

    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    for (element, value) in &config.settings.enabled {
        if let Err(e) = validate_element_name(element) {
            errors.push(format!("settings.enabled.{}: {}", element, e));
        }
        if ![ON, OFF, DISABLED].contains(&value.as_str()) {
            errors.push(format!(
                "settings.enabled.{}: invalid value '{}': use on, off or disabled",
                element, value
            ));
        }
    }

    for (element, value) in &config.settings.advanced {
        if let Err(e) = validate_element_name(element) {
            errors.push(format!("settings.advanced.{}: {}", element, e));
        }
        if ![ON, OFF].contains(&value.as_str()) {
            errors.push(format!(
                "settings.advanced.{}: invalid value '{}': use on or off",
                element, value
            ));
        }
        if value == ON && config.settings.enabled_state(element) == EnabledState::Disabled {
            errors.push(format!(
                "settings.advanced.{}: element is disabled, advanced mode has no effect",
                element
            ));
        }
    }

    Ok(errors)
}

/// element base names are shortcode tag names
pub fn validate_element_name(element: &str) -> Result<(), String> {
    if element.is_empty() {
        return Err("element name is empty".to_string());
    }
    if let Some(c) = element
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!(
            "invalid character '{}' in element name '{}'",
            c, element
        ));
    }
    Ok(())
}

pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["settings", "enabled", element] => {
            validate_element_name(element).map_err(|e| anyhow!(e))?;
            let state = match value.to_lowercase().as_str() {
                "disabled" => EnabledState::Disabled,
                _ => {
                    if parse_bool(value)? {
                        EnabledState::Enabled
                    } else {
                        EnabledState::Default
                    }
                }
            };
            config.settings.set_element(*element, state);
        }
        ["settings", "advanced", element] => {
            validate_element_name(element).map_err(|e| anyhow!(e))?;
            config.settings.set_advanced(*element, parse_bool(value)?);
        }
        ["predicates", name] if !name.is_empty() => {
            config.predicates.insert(name.to_string(), parse_bool(value)?);
        }
        _ => {
            return Err(anyhow!(
                "Unknown config key: {}. Valid keys: settings.enabled.<element>, settings.advanced.<element>, predicates.<name>",
                key
            ));
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(anyhow!(
            "Invalid boolean value: {}. Use true/false, yes/no, 1/0, or on/off",
            value
        )),
    }
}
