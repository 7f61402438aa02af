use serde::{Deserialize, Serialize};

use crate::error::CsgError;
use crate::math::Tolerances;
use crate::operations::PivotMode;

/// Tunables of a model. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsgSettings {
    pub tolerances: Tolerances,
    /// Distance in front of and behind a fragment at which composition samples the solid.
    pub classification_offset: f32,
    pub grid_spacing: f32,
    pub pivot_mode: PivotMode,
}

impl Default for CsgSettings {
    fn default() -> Self {
        CsgSettings {
            tolerances: Tolerances::default(),
            classification_offset: 0.001,
            grid_spacing: 1.0,
            pivot_mode: PivotMode::Global,
        }
    }
}

impl CsgSettings {
    pub fn from_json(json: &str) -> Result<CsgSettings, CsgError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CsgError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
