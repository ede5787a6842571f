use serde::{Deserialize, Serialize};

/// Behavioural and population parameters for one world.
/// Stored with the world so a run can be reproduced from its resolved seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Fraction of cells initially holding a cop.
    #[serde(default = "default_cop_density")]
    pub cop_density: f64,
    /// Fraction of cells initially holding an agent.
    #[serde(default = "default_agent_density")]
    pub agent_density: f64,
    /// Radius of the neighbourhood, in cells (Euclidean).
    #[serde(default = "default_vision")]
    pub vision: f64,
    /// Factor for determining arrest probability.
    #[serde(default = "default_k")]
    pub k: f64,
    /// By how much grievance must exceed perceived risk to rebel.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_max_jail_term")]
    pub max_jail_term: u32,
    #[serde(default = "default_government_legitimacy")]
    pub government_legitimacy: f64,
    /// When set, every mobile entity relocates to a random free cell at the
    /// start of its update.
    #[serde(default)]
    pub movement: bool,
    /// 0 picks a random seed at world construction.
    #[serde(default)]
    pub seed: u64,
}

fn default_width() -> u32 {
    40
}
fn default_height() -> u32 {
    40
}
fn default_cop_density() -> f64 {
    0.04
}
fn default_agent_density() -> f64 {
    0.70
}
fn default_vision() -> f64 {
    7.0
}
fn default_k() -> f64 {
    2.3
}
fn default_threshold() -> f64 {
    0.1
}
fn default_max_jail_term() -> u32 {
    30
}
fn default_government_legitimacy() -> f64 {
    0.82
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            width: default_width(),
            height: default_height(),
            cop_density: default_cop_density(),
            agent_density: default_agent_density(),
            vision: default_vision(),
            k: default_k(),
            threshold: default_threshold(),
            max_jail_term: default_max_jail_term(),
            government_legitimacy: default_government_legitimacy(),
            movement: false,
            seed: 0,
        }
    }
}

impl ModelParams {
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of cops: `floor(cells * cop_density)`.
    pub fn cop_count(&self) -> usize {
        (self.cell_count() as f64 * self.cop_density).floor() as usize
    }

    /// Number of agents: `floor(cells * agent_density)`.
    pub fn agent_count(&self) -> usize {
        (self.cell_count() as f64 * self.agent_density).floor() as usize
    }

    /// Validate parameter ranges. All problems are reported together.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.width == 0 {
            errors.push("width must be >= 1, got 0. Example: width = 40".to_string());
        }
        if self.height == 0 {
            errors.push("height must be >= 1, got 0. Example: height = 40".to_string());
        }

        check_unit_range(&mut errors, "cop_density", self.cop_density, "0.04");
        check_unit_range(&mut errors, "agent_density", self.agent_density, "0.7");
        check_unit_range(
            &mut errors,
            "government_legitimacy",
            self.government_legitimacy,
            "0.82",
        );

        if !self.vision.is_finite() || self.vision < 0.0 {
            errors.push(format!(
                "vision must be a finite value >= 0.0, got {}. Example: vision = 7.0",
                self.vision
            ));
        }
        if !self.k.is_finite() {
            errors.push(format!("k must be finite, got {}. Example: k = 2.3", self.k));
        }
        if !self.threshold.is_finite() {
            errors.push(format!(
                "threshold must be finite, got {}. Example: threshold = 0.1",
                self.threshold
            ));
        }

        // Only meaningful once the densities themselves are sane.
        if errors.is_empty() {
            let population = self.cop_count() + self.agent_count();
            if population > self.cell_count() {
                errors.push(format!(
                    "population of {} cops and {} agents exceeds {} cells; \
                     lower cop_density + agent_density to at most 1.0",
                    self.cop_count(),
                    self.agent_count(),
                    self.cell_count()
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

fn check_unit_range(errors: &mut Vec<String>, name: &str, value: f64, example: &str) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(format!(
            "{} must be 0.0-1.0, got {}. Example: {} = {}",
            name, value, name, example
        ));
    }
}
