use serde::Deserialize;
use std::path::Path;

use crate::config::model::ModelParams;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f32,
    /// 0 runs until interrupted.
    #[serde(default)]
    pub max_ticks: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_render")]
    pub render: bool,
    #[serde(default)]
    pub stats_output: Option<String>,
    #[serde(default = "default_report_threshold")]
    pub report_threshold: f64,
    #[serde(default)]
    pub model: ModelParams,
}

fn default_tick_rate() -> f32 {
    1.0
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_render() -> bool {
    true
}
fn default_report_threshold() -> f64 {
    0.5
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_rate_hz: default_tick_rate(),
            max_ticks: 0,
            log_level: default_log_level(),
            log_format: default_log_format(),
            render: default_render(),
            stats_output: None,
            report_threshold: default_report_threshold(),
            model: ModelParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if !(self.tick_rate_hz > 0.0 && self.tick_rate_hz.is_finite()) {
            errors.push(format!(
                "tick_rate_hz must be > 0.0, got {}. Example: tick_rate_hz = 1.0",
                self.tick_rate_hz
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            errors.push(format!(
                "log_format must be one of {:?}, got '{}'. Example: log_format = \"text\"",
                valid_formats, self.log_format
            ));
        }

        if !(0.0..=1.0).contains(&self.report_threshold) {
            errors.push(format!(
                "report_threshold must be 0.0-1.0, got {}. Example: report_threshold = 0.5",
                self.report_threshold
            ));
        }

        if let Err(model_errors) = self.model.validate() {
            errors.extend(model_errors.lines().map(|line| format!("model.{}", line)));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    /// Delay between ticks in the driver loop.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.tick_rate_hz)
    }
}
