//! Configuration loading for Scaffold.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.scaffold/config.toml`)
//! 3. User config (`~/.scaffold/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The defaults are the tutoring policy
//! constants (stuck threshold 3, mastery bands 0.25/0.5/0.7/0.9); config
//! only exists so deployments can tune them without a rebuild.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FailOpen, Result, ScaffoldError};

/// Main configuration struct for Scaffold.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Local equivalence checking.
    pub equivalence: EquivalenceConfig,
    /// Escalation to the external verifier.
    pub escalation: EscalationConfig,
    /// Stuck-state detection.
    pub stuck: StuckConfig,
    /// Mastery banding.
    pub mastery: MasteryConfig,
}

/// Local equivalence checking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EquivalenceConfig {
    /// Absolute tolerance for numeric comparison.
    pub absolute_tolerance: f64,
    /// Relative tolerance for numeric comparison.
    pub relative_tolerance: f64,
    /// Maximum number of terms an algebraic form may expand to.
    pub max_terms: usize,
    /// Maximum integer exponent accepted in algebraic forms.
    pub max_exponent: u32,
}

impl EquivalenceConfig {
    /// Check if a tolerance value is valid (finite and non-negative).
    pub fn is_valid_tolerance(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-9,
            relative_tolerance: 1e-9,
            max_terms: 64,
            max_exponent: 12,
        }
    }
}

/// Escalation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EscalationConfig {
    /// Whether low-confidence verdicts are escalated at all.
    pub enabled: bool,
    /// Timeout handed to the verifier, in milliseconds.
    pub timeout_ms: u64,
}

/// Minimum valid escalation timeout (1ms).
pub const MIN_TIMEOUT_MS: u64 = 1;

impl EscalationConfig {
    /// Check if a timeout value is valid (must be >= 1ms).
    pub fn is_valid_timeout_ms(value: u64) -> bool {
        value >= MIN_TIMEOUT_MS
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 5000,
        }
    }
}

/// Stuck-state configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StuckConfig {
    /// Consecutive wrong answers that force a Refocus turn.
    pub threshold: u32,
}

/// Minimum valid stuck threshold.
///
/// A threshold of 0 would force Refocus on every turn.
pub const MIN_STUCK_THRESHOLD: u32 = 1;

impl StuckConfig {
    /// Check if a threshold is valid (must be >= 1).
    pub fn is_valid_threshold(value: u32) -> bool {
        value >= MIN_STUCK_THRESHOLD
    }
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self { threshold: 3 }
    }
}

/// Mastery banding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MasteryConfig {
    /// Lower bounds (inclusive) of mastery levels 1 through 4.
    pub thresholds: [f64; 4],
}

/// Default lower bounds of mastery levels 1 through 4.
pub const DEFAULT_MASTERY_THRESHOLDS: [f64; 4] = [0.25, 0.5, 0.7, 0.9];

impl MasteryConfig {
    /// Check if a threshold table is valid.
    ///
    /// Every bound must lie in `(0, 1]` and the table must be strictly
    /// increasing, otherwise bands would overlap or be unreachable.
    pub fn is_valid_thresholds(thresholds: &[f64; 4]) -> bool {
        thresholds
            .iter()
            .all(|t| t.is_finite() && *t > 0.0 && *t <= 1.0)
            && thresholds.windows(2).all(|w| w[0] < w[1])
    }
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_MASTERY_THRESHOLDS,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.scaffold/config.toml` in cwd)
    /// 3. User config (`~/.scaffold/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config.sanitize()
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config.sanitize()
    }

    /// Load user config from `~/.scaffold/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = scaffold_home()?;
        Self::load_layer(&home.join("config.toml"))
    }

    /// Load project config from `.scaffold/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_layer(&cwd.join(".scaffold").join("config.toml"))
    }

    /// Load one config layer. A missing file is skipped silently; an
    /// unreadable or malformed one is skipped with a warning.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_default(&format!("loading {}", path.display()))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| ScaffoldError::storage(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| ScaffoldError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_override(
            "SCAFFOLD_STUCK_THRESHOLD",
            StuckConfig::is_valid_threshold,
            "a positive integer",
        ) {
            self.stuck.threshold = n;
        }

        if let Ok(val) = env::var("SCAFFOLD_ESCALATION_ENABLED") {
            self.escalation.enabled = val == "true" || val == "1";
        }

        if let Some(n) = env_override(
            "SCAFFOLD_ESCALATION_TIMEOUT_MS",
            EscalationConfig::is_valid_timeout_ms,
            "a positive integer",
        ) {
            self.escalation.timeout_ms = n;
        }

        if let Some(n) = env_override(
            "SCAFFOLD_ABS_TOLERANCE",
            EquivalenceConfig::is_valid_tolerance,
            "a non-negative decimal number",
        ) {
            self.equivalence.absolute_tolerance = n;
        }

        if let Some(n) = env_override(
            "SCAFFOLD_REL_TOLERANCE",
            EquivalenceConfig::is_valid_tolerance,
            "a non-negative decimal number",
        ) {
            self.equivalence.relative_tolerance = n;
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence. All non-default fields from `other`
    /// are applied to `self`, field by field, so each layer only needs to
    /// specify its customizations.
    ///
    /// # Limitation
    ///
    /// A layer cannot set a value back to the default to override a
    /// non-default value from a lower-precedence layer.
    fn merge(mut self, other: Config) -> Self {
        let default_eq = EquivalenceConfig::default();
        if other.equivalence.absolute_tolerance != default_eq.absolute_tolerance {
            self.equivalence.absolute_tolerance = other.equivalence.absolute_tolerance;
        }
        if other.equivalence.relative_tolerance != default_eq.relative_tolerance {
            self.equivalence.relative_tolerance = other.equivalence.relative_tolerance;
        }
        if other.equivalence.max_terms != default_eq.max_terms {
            self.equivalence.max_terms = other.equivalence.max_terms;
        }
        if other.equivalence.max_exponent != default_eq.max_exponent {
            self.equivalence.max_exponent = other.equivalence.max_exponent;
        }

        let default_esc = EscalationConfig::default();
        if other.escalation.enabled != default_esc.enabled {
            self.escalation.enabled = other.escalation.enabled;
        }
        if other.escalation.timeout_ms != default_esc.timeout_ms {
            self.escalation.timeout_ms = other.escalation.timeout_ms;
        }

        if other.stuck.threshold != StuckConfig::default().threshold {
            self.stuck.threshold = other.stuck.threshold;
        }

        if other.mastery.thresholds != MasteryConfig::default().thresholds {
            self.mastery.thresholds = other.mastery.thresholds;
        }

        self
    }

    /// Replace invalid values (from files) with defaults.
    fn sanitize(mut self) -> Self {
        let default_eq = EquivalenceConfig::default();
        if !EquivalenceConfig::is_valid_tolerance(self.equivalence.absolute_tolerance) {
            tracing::warn!(
                "Invalid equivalence.absolute_tolerance {}, using default {}",
                self.equivalence.absolute_tolerance,
                default_eq.absolute_tolerance
            );
            self.equivalence.absolute_tolerance = default_eq.absolute_tolerance;
        }
        if !EquivalenceConfig::is_valid_tolerance(self.equivalence.relative_tolerance) {
            tracing::warn!(
                "Invalid equivalence.relative_tolerance {}, using default {}",
                self.equivalence.relative_tolerance,
                default_eq.relative_tolerance
            );
            self.equivalence.relative_tolerance = default_eq.relative_tolerance;
        }
        if !EscalationConfig::is_valid_timeout_ms(self.escalation.timeout_ms) {
            tracing::warn!(
                "Invalid escalation.timeout_ms {}, using default {}",
                self.escalation.timeout_ms,
                EscalationConfig::default().timeout_ms
            );
            self.escalation.timeout_ms = EscalationConfig::default().timeout_ms;
        }
        if !StuckConfig::is_valid_threshold(self.stuck.threshold) {
            tracing::warn!(
                "Invalid stuck.threshold {}, must be >= {}. Using default {}",
                self.stuck.threshold,
                MIN_STUCK_THRESHOLD,
                StuckConfig::default().threshold
            );
            self.stuck.threshold = StuckConfig::default().threshold;
        }
        if !MasteryConfig::is_valid_thresholds(&self.mastery.thresholds) {
            tracing::warn!(
                "Invalid mastery.thresholds {:?}, using default {:?}",
                self.mastery.thresholds,
                DEFAULT_MASTERY_THRESHOLDS
            );
            self.mastery.thresholds = DEFAULT_MASTERY_THRESHOLDS;
        }
        self
    }
}

/// Read and validate one environment override.
///
/// Returns `None` (with a warning) when the variable is set but unusable.
fn env_override<T>(name: &str, is_valid: fn(T) -> bool, expected: &str) -> Option<T>
where
    T: FromStr + Copy + std::fmt::Display,
{
    let val = env::var(name).ok()?;
    match val.parse::<T>() {
        Ok(n) if is_valid(n) => Some(n),
        Ok(n) => {
            tracing::warn!("Invalid {} value '{}'. Expected {}. Ignoring.", name, n, expected);
            None
        }
        Err(_) => {
            tracing::warn!(
                "Invalid {} value '{}'. Expected {}. Ignoring.",
                name,
                val,
                expected
            );
            None
        }
    }
}

/// Get the Scaffold home directory.
///
/// Checks `SCAFFOLD_HOME` first, then falls back to `~/.scaffold`.
/// An empty `SCAFFOLD_HOME` is ignored.
pub fn scaffold_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("SCAFFOLD_HOME") {
        if home.is_empty() {
            tracing::warn!("SCAFFOLD_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("SCAFFOLD_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".scaffold"))
}
