//! Rig configuration — motion, lifecycle and layout in one document

use rf_lifecycle::LifecycleConfig;
use rf_reel::{ItemGeometry, MotionConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{SimError, SimResult};

/// Synthetic layout standing in for the host's widget tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Number of reel items
    #[serde(default = "default_items")]
    pub items: usize,
    /// Height of each item
    #[serde(default = "default_extent")]
    pub extent: f32,
    /// Distance between consecutive items
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    /// Viewport in content space; `None` uses extent-derived geometry
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

fn default_items() -> usize {
    5
}
fn default_extent() -> f32 {
    100.0
}
fn default_spacing() -> f32 {
    100.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            items: default_items(),
            extent: default_extent(),
            spacing: default_spacing(),
            viewport: None,
        }
    }
}

impl LayoutConfig {
    /// Item geometry for the layout
    pub fn item_geometry(&self) -> Vec<ItemGeometry> {
        ItemGeometry::column(self.items, self.extent, self.spacing)
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl RigConfig {
    /// Parse from JSON; missing sections take their defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("loaded rig config from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.motion.validate()?;
        self.lifecycle.validate()?;

        let layout = &self.layout;
        if !layout.extent.is_finite() || layout.extent <= 0.0 {
            return Err(SimError::InvalidLayout(format!(
                "extent must be positive, got {}",
                layout.extent
            )));
        }
        if !layout.spacing.is_finite() || layout.spacing < 0.0 {
            return Err(SimError::InvalidLayout(format!(
                "spacing must be non-negative, got {}",
                layout.spacing
            )));
        }
        if layout.items == 0 {
            log::warn!("layout has no items; the reel will stay inert");
        }
        Ok(())
    }
}
