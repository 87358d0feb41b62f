//! Rolling-window rule parameters
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_QUOTA_DAYS, DEFAULT_WINDOW_LENGTH_DAYS};
use crate::error::RulesError;

/// Quota and window length of the rolling rule.
///
/// The window is inclusive of the reference date, so with the defaults it
/// spans `reference - 179 ..= reference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRules {
    #[serde(default = "WindowRules::default_quota_days")]
    pub quota_days: u32,
    #[serde(default = "WindowRules::default_window_length_days")]
    pub window_length_days: u32,
}

impl WindowRules {
    const fn default_quota_days() -> u32 {
        DEFAULT_QUOTA_DAYS
    }

    const fn default_window_length_days() -> u32 {
        DEFAULT_WINDOW_LENGTH_DAYS
    }

    /// Parse rules from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or the resulting
    /// rules fail [`WindowRules::validate`].
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self =
            serde_json::from_str(json).map_err(|err| RulesError::Parse(err.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check that the rules describe an evaluable window.
    ///
    /// # Errors
    ///
    /// Returns an error when either length is zero or the quota does not fit
    /// inside the window.
    pub const fn validate(&self) -> Result<(), RulesError> {
        if self.quota_days == 0 {
            return Err(RulesError::Zero {
                field: "quota_days",
            });
        }
        if self.window_length_days == 0 {
            return Err(RulesError::Zero {
                field: "window_length_days",
            });
        }
        if self.quota_days > self.window_length_days {
            return Err(RulesError::QuotaExceedsWindow {
                quota: self.quota_days,
                window: self.window_length_days,
            });
        }
        Ok(())
    }

    /// Offset from the reference date back to the first day of the window.
    #[must_use]
    pub const fn lookback_days(&self) -> u32 {
        self.window_length_days.saturating_sub(1)
    }

    /// Offset from a visit's exit date to the day its last counted day has
    /// left the window.
    #[must_use]
    pub const fn reset_offset_days(&self) -> u32 {
        self.window_length_days.saturating_add(1)
    }
}

impl Default for WindowRules {
    fn default() -> Self {
        Self {
            quota_days: Self::default_quota_days(),
            window_length_days: Self::default_window_length_days(),
        }
    }
}
