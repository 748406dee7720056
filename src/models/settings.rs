use serde::{Deserialize, Serialize};

/// Server-wide display defaults. Clock size is in vw units; font scale is a
/// multiplier applied to the rest of the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub clock_size: f64,
    pub font_scale: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            clock_size: 16.0,
            font_scale: 1.0,
        }
    }
}

impl DisplaySettings {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.clock_size.is_finite() || self.clock_size <= 0.0 {
            return Err("clock_size must be positive");
        }
        if !self.font_scale.is_finite() || self.font_scale <= 0.0 {
            return Err("font_scale must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub clock_size: f64,
    pub font_scale: f64,
}
