use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::annotate::InfoPanel;
use crate::detect::DetectionFilter;
use crate::frame::ChannelOrder;
use crate::palette::{Color, ColorPalette, DEFAULT_CLASSES, WITHOUT_MASK, WITH_MASK};
use crate::violation::ViolationRule;

pub const CONFIG_ENV: &str = "MASK_WITNESS_CONFIG";

const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DashboardConfigFile {
    confidence_threshold: Option<f32>,
    classes: Option<Vec<String>>,
    colors: Option<BTreeMap<String, Color>>,
    channel_order: Option<String>,
    font_path: Option<PathBuf>,
    violation: Option<ViolationConfigFile>,
    info_panel: Option<InfoPanelConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ViolationConfigFile {
    label: Option<String>,
    event: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct InfoPanelConfigFile {
    safe_label: Option<String>,
    risk_label: Option<String>,
}

/// Host-side dashboard settings.
///
/// Resolution order: built-in defaults, then the optional config file, then
/// `MASK_WITNESS_*` environment overrides, then validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Detections below this score are dropped before annotation/logging.
    pub confidence_threshold: f32,
    /// Labels the detector emits, in class-id order.
    pub classes: Vec<String>,
    /// Colour overrides (RGB) merged over the built-in table.
    pub colors: BTreeMap<String, Color>,
    pub channel_order: ChannelOrder,
    pub font_path: Option<PathBuf>,
    pub violation: ViolationRule,
    pub safe_label: String,
    pub risk_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            classes: default_classes(),
            colors: BTreeMap::new(),
            channel_order: ChannelOrder::default(),
            font_path: None,
            violation: ViolationRule::default(),
            safe_label: WITH_MASK.to_string(),
            risk_label: WITHOUT_MASK.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load using the file named by `MASK_WITNESS_CONFIG`, if any.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::load_from(config_path.as_deref())
    }

    /// Load using an explicit config file (JSON, or TOML by extension).
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => DashboardConfigFile::default(),
        };
        let explicit_risk_label = file_cfg
            .info_panel
            .as_ref()
            .and_then(|panel| panel.risk_label.clone());
        let mut cfg = Self::from_file(file_cfg)?;
        cfg.apply_env()?;
        // The risk count follows the violation label unless pinned in the file.
        if explicit_risk_label.is_none() {
            cfg.risk_label = cfg.violation.label.clone();
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: DashboardConfigFile) -> Result<Self> {
        let channel_order = match file.channel_order.as_deref() {
            Some(order) => order.parse()?,
            None => ChannelOrder::default(),
        };
        let defaults = ViolationRule::default();
        let violation_label = file
            .violation
            .as_ref()
            .and_then(|v| v.label.clone())
            .unwrap_or(defaults.label);
        let violation_event = file
            .violation
            .and_then(|v| v.event)
            .unwrap_or(defaults.event);
        let safe_label = file
            .info_panel
            .as_ref()
            .and_then(|panel| panel.safe_label.clone())
            .unwrap_or_else(|| WITH_MASK.to_string());
        let risk_label = file
            .info_panel
            .and_then(|panel| panel.risk_label)
            .unwrap_or_else(|| violation_label.clone());
        Ok(Self {
            confidence_threshold: file
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            classes: file.classes.unwrap_or_else(default_classes),
            colors: file.colors.unwrap_or_default(),
            channel_order,
            font_path: file.font_path,
            violation: ViolationRule::new(violation_label, violation_event),
            safe_label,
            risk_label,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(threshold) = std::env::var("MASK_WITNESS_CONFIDENCE") {
            self.confidence_threshold = threshold.trim().parse().map_err(|_| {
                anyhow!("MASK_WITNESS_CONFIDENCE must be a number between 0 and 1")
            })?;
        }
        if let Ok(order) = std::env::var("MASK_WITNESS_CHANNEL_ORDER") {
            if !order.trim().is_empty() {
                self.channel_order = order.parse()?;
            }
        }
        if let Ok(path) = std::env::var("MASK_WITNESS_FONT_PATH") {
            if !path.trim().is_empty() {
                self.font_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(label) = std::env::var("MASK_WITNESS_VIOLATION_LABEL") {
            if !label.trim().is_empty() {
                self.violation.label = label.trim().to_string();
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(anyhow!(
                "confidence_threshold must be within 0..=1, got {}",
                self.confidence_threshold
            ));
        }
        self.classes = self
            .classes
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if self.classes.is_empty() {
            return Err(anyhow!("classes must name at least one label"));
        }
        if self.violation.label.trim().is_empty() {
            return Err(anyhow!("violation label must not be empty"));
        }
        if !self.classes.contains(&self.violation.label) {
            log::warn!(
                "violation label '{}' is not one of the configured classes",
                self.violation.label
            );
        }
        Ok(())
    }

    pub fn palette(&self) -> ColorPalette {
        ColorPalette::new(&self.classes, Some(&self.colors))
    }

    pub fn detection_filter(&self) -> DetectionFilter {
        DetectionFilter::new(self.confidence_threshold)
    }

    pub fn info_panel(&self) -> InfoPanel {
        InfoPanel::new(self.safe_label.clone(), self.risk_label.clone())
    }
}

fn default_classes() -> Vec<String> {
    DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect()
}

fn read_config_file(path: &Path) -> Result<DashboardConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
