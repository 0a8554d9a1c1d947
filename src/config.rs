// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Environment-driven configuration.
//!
//! Every setting has a default; a variable that is set but cannot be parsed is an error rather
//! than a silent fallback.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DEBOUNCE_MS: &str = "THALASSA_DEBOUNCE_MS";
pub const ENV_PORT: &str = "THALASSA_PORT";
pub const ENV_STATIC_ROOT: &str = "THALASSA_STATIC_ROOT";
pub const ENV_STORE_DIR: &str = "THALASSA_STORE_DIR";
pub const ENV_OPEN_BROWSER: &str = "THALASSA_OPEN_BROWSER";

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_DIR: &str = ".thalassa";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse '{value}' ({reason})")]
    Invalid { key: &'static str, value: String, reason: String },
}

fn lookup_parse<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed.parse::<T>().map_err(|err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}

fn lookup_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected true/false".to_owned(),
        }),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Editing-session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Quiet interval after the last keystroke before the text is re-parsed.
    pub debounce: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS) }
    }
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debounce_ms = lookup_parse(&lookup, ENV_DEBOUNCE_MS, DEFAULT_DEBOUNCE_MS)?;
        Ok(Self { debounce: Duration::from_millis(debounce_ms) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub static_root: PathBuf,
    pub store_dir: PathBuf,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_root: PathBuf::from("."),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            open_browser: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: lookup_parse(&lookup, ENV_PORT, defaults.port)?,
            static_root: lookup_parse(&lookup, ENV_STATIC_ROOT, defaults.static_root)?,
            store_dir: lookup_parse(&lookup, ENV_STORE_DIR, defaults.store_dir)?,
            open_browser: lookup_bool(&lookup, ENV_OPEN_BROWSER, defaults.open_browser)?,
        })
    }
}
