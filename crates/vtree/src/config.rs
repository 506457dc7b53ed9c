#![forbid(unsafe_code)]

//! Search and scroll policy as data.
//!
//! [`TreeConfig`] groups the tunables of a [`crate::engine::VirtualTree`] and
//! can be loaded from TOML or JSON with the `config` feature.
//!
//! ```toml
//! # vtree.toml
//! [search]
//! delimiter = "/"
//! ignore_case = true
//!
//! [viewport]
//! align = "start"
//! behavior = "instant"
//! ```
//!
//! ```rust,ignore
//! let config = TreeConfig::from_toml_file("vtree.toml")?.validated()?;
//! ```
//!
//! Missing sections and fields fall back to the defaults, so an empty file is
//! a valid configuration.

#[cfg(feature = "config")]
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::search::{DEFAULT_DELIMITER, SearchOptions};
use crate::viewport::{ScrollAlign, ScrollBehavior, Viewport};

/// Characters with a meaning in regex syntax.
const REGEX_META: &str = r"\.+*?()|[]{}^$";

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Pattern compilation.
    pub search: SearchConfig,
    /// Scroll request policy.
    pub viewport: ViewportConfig,
}

/// Pattern compilation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Segment delimiter.
    pub delimiter: char,
    /// Case-insensitive segments.
    pub ignore_case: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            ignore_case: false,
        }
    }
}

/// Scroll request settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewportConfig {
    /// Placement of revealed rows.
    pub align: ScrollAlign,
    /// Scroll animation.
    pub behavior: ScrollBehavior,
}

impl TreeConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check the settings.
    ///
    /// Returns a list of problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let delimiter = self.search.delimiter;

        if REGEX_META.contains(delimiter) {
            errors.push(format!(
                "search.delimiter must not be a regex metacharacter, got {delimiter:?}"
            ));
        }
        if delimiter.is_whitespace() || delimiter.is_control() {
            errors.push(format!(
                "search.delimiter must be a visible character, got {delimiter:?}"
            ));
        }

        errors
    }

    /// `self` if [`Self::validate`] finds nothing, else [`ConfigError::Invalid`].
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Options for [`crate::search::search`].
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::default()
            .delimiter(self.search.delimiter)
            .ignore_case(self.search.ignore_case)
    }

    /// A viewport carrying the configured scroll policy.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new()
            .with_align(self.viewport.align)
            .with_behavior(self.viewport.behavior)
    }
}
