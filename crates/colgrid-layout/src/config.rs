#![forbid(unsafe_code)]

//! Grid configuration.
//!
//! Every tunable the width model, document validation, and drag controller
//! read lives in [`GridConfig`]. Defaults match the structural constants in
//! [`crate::width`], so `GridConfig::default()` is the canonical grid.
//!
//! # Loading
//!
//! ```toml
//! # colgrid.toml
//! min_width = 8.0
//! max_columns = 6
//! ```
//!
//! ```rust,ignore
//! let config = GridConfig::from_toml_file("colgrid.toml")?;
//! let config = GridConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::width::{MAX_COLUMNS, MIN_COLUMNS, MIN_WIDTH, WIDTH_SUM, WIDTH_SUM_TOLERANCE, WidthBounds};

/// Tunables for grids, width normalization, and drag behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Smallest width a column may shrink to, in percent.
    pub min_width: f64,
    /// Fewest columns a grid may hold.
    pub min_columns: usize,
    /// Most columns a grid may hold.
    pub max_columns: usize,
    /// Accepted deviation of the width sum from 100.
    pub width_tolerance: f64,
    /// Pointer travel, in pixels, below which a drag frame is not committed.
    /// Zero commits every frame that changes the pointer position.
    pub drag_min_delta_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_WIDTH,
            min_columns: MIN_COLUMNS,
            max_columns: MAX_COLUMNS,
            width_tolerance: WIDTH_SUM_TOLERANCE,
            drag_min_delta_px: 0.0,
        }
    }
}

impl GridConfig {
    /// Bounds used to validate committed width vectors.
    #[must_use]
    pub fn bounds(&self) -> WidthBounds {
        WidthBounds {
            min_width: self.min_width,
            min_columns: self.min_columns,
            max_columns: self.max_columns,
            tolerance: self.width_tolerance,
        }
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; an empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.min_width.is_finite() || self.min_width < 0.0 {
            errors.push(format!(
                "min_width must be a non-negative number, got {}",
                self.min_width
            ));
        }
        if self.min_columns < 1 {
            errors.push("min_columns must be at least 1".to_string());
        }
        if self.max_columns < self.min_columns {
            errors.push(format!(
                "max_columns ({}) must be >= min_columns ({})",
                self.max_columns, self.min_columns
            ));
        }
        if self.min_width.is_finite() && self.min_width * self.max_columns as f64 > WIDTH_SUM {
            errors.push(format!(
                "min_width {} times max_columns {} exceeds 100",
                self.min_width, self.max_columns
            ));
        }
        if !self.width_tolerance.is_finite() || self.width_tolerance <= 0.0 {
            errors.push(format!(
                "width_tolerance must be positive, got {}",
                self.width_tolerance
            ));
        }
        if !self.drag_min_delta_px.is_finite() || self.drag_min_delta_px < 0.0 {
            errors.push(format!(
                "drag_min_delta_px must be a non-negative number, got {}",
                self.drag_min_delta_px
            ));
        }

        errors
    }

    /// Return `self` if valid, or every validation message.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

/// Errors from loading or validating a [`GridConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
