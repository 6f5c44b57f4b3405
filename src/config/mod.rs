//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::models::Tiebreaks;
use crate::policy::ColorRule;

/// Largest graph the exact matcher may be configured for; its tables grow
/// as 2^n.
pub const MAX_EXACT_SOLVER_LIMIT: usize = 24;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Edge weights used by the pairing policy.
///
/// These are tuning values, not derived from an optimality criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingWeights {
    /// Weight of a pairing inside one score group
    #[serde(default = "default_same_bucket")]
    pub same_bucket: f64,

    /// Base weight of a singleton-rescue pairing across score groups
    #[serde(default = "default_cross_bucket")]
    pub cross_bucket: f64,

    /// Deducted per point of score difference
    #[serde(default = "default_points_penalty")]
    pub points_penalty: f64,

    /// Deducted per game of games-played difference
    #[serde(default = "default_games_penalty")]
    pub games_penalty: f64,
}

fn default_same_bucket() -> f64 {
    10_000.0
}

fn default_cross_bucket() -> f64 {
    100.0
}

fn default_points_penalty() -> f64 {
    50.0
}

fn default_games_penalty() -> f64 {
    500.0
}

impl Default for PairingWeights {
    fn default() -> Self {
        Self {
            same_bucket: default_same_bucket(),
            cross_bucket: default_cross_bucket(),
            points_penalty: default_points_penalty(),
            games_penalty: default_games_penalty(),
        }
    }
}

/// Pairing engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// "strict" or "soft"
    #[serde(default)]
    pub color_rule: ColorRule,

    /// Overlapping rounds: competitors may be at most this many rounds
    /// apart. Unset means no window.
    #[serde(default)]
    pub round_window: Option<u32>,

    /// Largest number of competitors in one connected group the exact
    /// matcher handles before the greedy fallback takes over
    #[serde(default = "default_exact_solver_limit")]
    pub exact_solver_limit: usize,

    #[serde(default)]
    pub weights: PairingWeights,
}

fn default_exact_solver_limit() -> usize {
    20
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            color_rule: ColorRule::default(),
            round_window: None,
            exact_solver_limit: default_exact_solver_limit(),
            weights: PairingWeights::default(),
        }
    }
}

/// Physical board pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of boards, numbered from 1
    #[serde(default = "default_board_count")]
    pub count: u32,

    /// Simultaneous games allowed per board
    #[serde(default = "default_per_board_limit")]
    pub per_board_limit: u32,
}

fn default_board_count() -> u32 {
    30
}

fn default_per_board_limit() -> u32 {
    2
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            count: default_board_count(),
            per_board_limit: default_per_board_limit(),
        }
    }
}

impl BoardConfig {
    /// Total simultaneous games the pool can host.
    pub fn capacity(&self) -> u32 {
        self.count.saturating_mul(self.per_board_limit)
    }
}

/// Standings configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandingsConfig {
    /// "full" or "buchholz"
    #[serde(default)]
    pub tiebreaks: Tiebreaks,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub pairing: PairingConfig,

    #[serde(default)]
    pub boards: BoardConfig,

    #[serde(default)]
    pub standings: StandingsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            pairing: PairingConfig::default(),
            boards: BoardConfig::default(),
            standings: StandingsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boards.count == 0 {
            return Err(ConfigError::ValidationError(
                "Board count must be greater than 0".to_string(),
            ));
        }

        if self.boards.per_board_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Per-board game limit must be greater than 0".to_string(),
            ));
        }

        if self.pairing.round_window == Some(0) {
            return Err(ConfigError::ValidationError(
                "Round window must be at least 1".to_string(),
            ));
        }

        if self.pairing.exact_solver_limit > MAX_EXACT_SOLVER_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "Exact solver limit must be at most {}",
                MAX_EXACT_SOLVER_LIMIT
            )));
        }

        let weights = &self.pairing.weights;
        if weights.points_penalty < 0.0 || weights.games_penalty < 0.0 {
            return Err(ConfigError::ValidationError(
                "Pairing penalties must not be negative".to_string(),
            ));
        }

        if weights.cross_bucket >= weights.same_bucket {
            return Err(ConfigError::ValidationError(
                "Cross-bucket weight must stay below same-bucket weight".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.pairing.color_rule, ColorRule::Strict);
        assert_eq!(config.pairing.round_window, None);
        assert_eq!(config.boards.count, 30);
        assert_eq!(config.boards.per_board_limit, 2);
        assert_eq!(config.boards.capacity(), 60);
        assert_eq!(config.standings.tiebreaks, Tiebreaks::Full);
    }

    #[test]
    fn test_weights_default() {
        let weights = PairingWeights::default();

        assert_eq!(weights.same_bucket, 10_000.0);
        assert_eq!(weights.cross_bucket, 100.0);
        assert_eq!(weights.points_penalty, 50.0);
        assert_eq!(weights.games_penalty, 500.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [pairing]
            color_rule = "soft"
            round_window = 2

            [boards]
            count = 12
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.pairing.color_rule, ColorRule::Soft);
        assert_eq!(config.pairing.round_window, Some(2));
        assert_eq!(config.pairing.exact_solver_limit, 20);
        assert_eq!(config.boards.count, 12);
        assert_eq!(config.boards.per_board_limit, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_boards() {
        let mut config = AppConfig::default();
        config.boards.count = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.boards.per_board_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_pairing() {
        let mut config = AppConfig::default();
        config.pairing.round_window = Some(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pairing.exact_solver_limit = MAX_EXACT_SOLVER_LIMIT + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pairing.weights.cross_bucket = 20_000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.boards.count, 30);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[boards]\ncount = 0\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.pairing.weights, parsed.pairing.weights);
    }
}
