//! Threshold-based automatic action switching.
//!
//! After each update the division checks its stamina against two
//! thresholds. At or below the low threshold it switches to the low action
//! (usually something restful); at or above the high threshold it switches
//! back to the high action. Nothing happens if the target is already
//! running.

use bladeburner_types::ActionId;
use serde::{Deserialize, Serialize};

use crate::config::AutomationConfig;
use crate::error::DivisionError;

/// Resolved automation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    /// Whether automation runs at all.
    pub enabled: bool,
    /// Action started when stamina is low.
    pub low_action: Option<ActionId>,
    /// Stamina at or below which the low action starts.
    pub low_threshold: f64,
    /// Action started when stamina is high.
    pub high_action: Option<ActionId>,
    /// Stamina at or above which the high action starts.
    pub high_threshold: f64,
}

impl Automation {
    /// Resolve action names from configuration.
    ///
    /// # Errors
    ///
    /// Returns an action-not-found error for an unknown action name.
    pub fn from_config(config: &AutomationConfig) -> Result<Self, DivisionError> {
        Ok(Self {
            enabled: config.enabled,
            low_action: resolve(config.low_action.as_deref())?,
            low_threshold: config.low_threshold,
            high_action: resolve(config.high_action.as_deref())?,
            high_threshold: config.high_threshold,
        })
    }

    /// The action automation wants to switch to, if any.
    pub fn decide(&self, stamina: f64, current: Option<ActionId>) -> Option<ActionId> {
        if !self.enabled {
            return None;
        }
        if let Some(low) = self.low_action
            && stamina <= self.low_threshold
            && current != Some(low)
        {
            return Some(low);
        }
        if let Some(high) = self.high_action
            && stamina >= self.high_threshold
            && current != Some(high)
        {
            return Some(high);
        }
        None
    }
}

fn resolve(name: Option<&str>) -> Result<Option<ActionId>, DivisionError> {
    name.map(|n| {
        ActionId::find(n).ok_or_else(|| bladeburner_actions::ActionError::NotFound(n.to_owned()))
    })
    .transpose()
    .map_err(DivisionError::from)
}
