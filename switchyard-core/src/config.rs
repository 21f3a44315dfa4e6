//! Process-wide routing defaults
//!
//! Defaults for every controller's routing policy, loaded from TOML and
//! overridden by `SWITCHYARD_*` environment variables.
//!
//! ```toml
//! [switchyard]
//! action_routing = true
//! restful_routing = true
//! auto_routing = false
//! res_func = "jsonp"
//! expose_stack = false
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const ENV_PREFIX: &str = "SWITCHYARD_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchyardConfig {
    /// Resolve actions from the URL, route parameters and override names.
    pub action_routing: bool,
    /// Fall back to verb actions (`getAction`, `listAction`, ...).
    pub restful_routing: bool,
    /// Bind derived or declared routes when a controller is registered.
    pub auto_routing: bool,
    /// Default emission mode for `send`.
    pub res_func: String,
    /// Include the error source chain in exception responses.
    pub expose_stack: bool,
}

impl Default for SwitchyardConfig {
    fn default() -> Self {
        Self {
            action_routing: true,
            restful_routing: true,
            auto_routing: true,
            res_func: "json".to_string(),
            expose_stack: true,
        }
    }
}

impl SwitchyardConfig {
    /// Parse TOML, either at the top level or under a `[switchyard]` table.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let value: toml::Table =
            toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;

        let table = match value.get("switchyard") {
            Some(toml::Value::Table(section)) => section.clone(),
            Some(_) => return Err(Error::Config("`switchyard` must be a table".to_string())),
            None => value,
        };

        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Apply `SWITCHYARD_*` environment overrides on top of `self`.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)))
    }

    /// Apply overrides from `(name, value)` pairs using the environment's naming.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();

            match name {
                "ACTION_ROUTING" => self.action_routing = parse_bool(name, value)?,
                "RESTFUL_ROUTING" => self.restful_routing = parse_bool(name, value)?,
                "AUTO_ROUTING" => self.auto_routing = parse_bool(name, value)?,
                "EXPOSE_STACK" => self.expose_stack = parse_bool(name, value)?,
                "RES_FUNC" => {
                    if value.trim().is_empty() {
                        return Err(Error::Config(format!("{ENV_PREFIX}RES_FUNC is empty")));
                    }
                    self.res_func = value.trim().to_string();
                }
                // Logging variables belong to switchyard-log.
                _ => {}
            }
        }

        Ok(self)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{ENV_PREFIX}{name}: expected a boolean, got '{other}'"
        ))),
    }
}
