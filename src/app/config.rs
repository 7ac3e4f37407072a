//! Configuration Management
//!
//! Every numeric threshold and timing window in the engine lives here, in one
//! serde structure persisted as TOML under `~/.plank_coach/`. Defaults are the
//! calibrated production values; `validate()` rejects configurations that
//! would make the state machine misbehave (zero windows, inverted bands).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
    pub feedback: FeedbackConfig,
    pub telemetry: TelemetryConfig,
}

/// Frame analysis cadence and classification bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum landmark visibility for a measurement to count
    pub visibility_threshold: f64,
    /// Minimum gap between analyzed frames, in milliseconds
    pub interval_ms: u64,
    /// Elbow-vertex arm angle band recognized as a straight-arm plank
    pub high_band_degrees: (f64, f64),
    /// Elbow-vertex arm angle band recognized as a forearm plank
    pub elbow_band_degrees: (f64, f64),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.3,
            interval_ms: 100,
            high_band_degrees: (170.0, 190.0),
            elbow_band_degrees: (75.0, 105.0),
        }
    }
}

/// Per-criterion scoring thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Ideal shoulder-hip-ankle angle
    pub alignment_target: f64,
    /// Degrees of deviation forgiven before penalties start
    pub alignment_tolerance: f64,
    /// Score deducted per degree beyond the tolerance
    pub alignment_penalty_per_degree: f64,
    /// Alignment angle below which "raise your hips" is issued
    pub alignment_low_angle: f64,
    /// Alignment angle above which "lower your hips" is issued
    pub alignment_high_angle: f64,
    /// Knee angle at or above which the leg counts as straight
    pub knee_target: f64,
    /// Score deducted per degree of knee-angle deficit
    pub knee_penalty_per_degree: f64,
    /// Horizontal shoulder-over-joint offset for a perfect stack score
    pub stack_excellent_offset: f64,
    /// Horizontal offset for the middle stack score
    pub stack_good_offset: f64,
    /// Ideal vertical stacking angle
    pub stack_angle_target: f64,
    /// Stack-angle deviation tolerated before feedback is issued
    pub stack_angle_tolerance: f64,
    /// Score used for a criterion whose landmarks are not visible
    pub fallback_score: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alignment_target: 180.0,
            alignment_tolerance: 15.0,
            alignment_penalty_per_degree: 3.0,
            alignment_low_angle: 170.0,
            alignment_high_angle: 190.0,
            knee_target: 170.0,
            knee_penalty_per_degree: 2.0,
            stack_excellent_offset: 0.2,
            stack_good_offset: 0.3,
            stack_angle_target: 90.0,
            stack_angle_tolerance: 10.0,
            fallback_score: 50,
        }
    }
}

/// Session lifecycle timing windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a variant must hold steady before identification, in ms
    pub stability_window_ms: u64,
    /// Grace between identification and the timer starting, in ms
    pub start_grace_ms: u64,
    /// How long degraded form must persist before the session fails, in ms
    pub failure_window_ms: u64,
    /// Grace between form failure and the automatic stop, in ms
    pub stop_grace_ms: u64,
    /// Sub-score below which form quality resets the stability window
    pub quality_floor: u8,
    /// Sub-score below which a criterion counts toward form failure
    pub red_zone: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stability_window_ms: 800,
            start_grace_ms: 1_500,
            failure_window_ms: 2_000,
            stop_grace_ms: 1_000,
            quality_floor: 40,
            red_zone: 70,
        }
    }
}

/// Spoken feedback throttling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Elapsed-time callout period, in seconds
    pub callout_period_secs: u64,
    /// Minimum gap between an announcement and the next callout, in ms
    pub announcement_gap_ms: u64,
    /// Minimum gap between critical form corrections, in ms
    pub critical_gap_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            callout_period_secs: 10,
            announcement_gap_ms: 5_000,
            critical_gap_ms: 5_000,
        }
    }
}

/// Telemetry channel reconnection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// First reconnect delay, in ms (doubles per attempt)
    pub backoff_base_ms: u64,
    /// Reconnect delay ceiling, in ms
    pub backoff_cap_ms: u64,
    /// Reconnect attempts before the channel is abandoned
    pub max_attempts: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            backoff_base_ms: 1_000,
            backoff_cap_ms: 10_000,
            max_attempts: 5,
        }
    }
}

impl Config {
    /// Default configuration file path (`~/.plank_coach/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(".plank_coach").join("config.toml"))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default path, falling back to defaults when absent.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate threshold and window sanity.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.analysis.visibility_threshold) {
            return Err(Error::Config(
                "analysis.visibility_threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.analysis.interval_ms == 0 {
            return Err(Error::Config(
                "analysis.interval_ms must be positive".to_string(),
            ));
        }
        for (name, (lo, hi)) in [
            ("high_band_degrees", self.analysis.high_band_degrees),
            ("elbow_band_degrees", self.analysis.elbow_band_degrees),
        ] {
            if lo >= hi {
                return Err(Error::Config(format!(
                    "analysis.{} must be an increasing range",
                    name
                )));
            }
        }
        if self.scoring.stack_excellent_offset >= self.scoring.stack_good_offset {
            return Err(Error::Config(
                "scoring.stack_excellent_offset must be below stack_good_offset".to_string(),
            ));
        }
        if self.scoring.fallback_score > 100 {
            return Err(Error::Config(
                "scoring.fallback_score must be at most 100".to_string(),
            ));
        }
        if self.session.stability_window_ms == 0 || self.session.failure_window_ms == 0 {
            return Err(Error::Config(
                "session windows must be positive".to_string(),
            ));
        }
        if self.session.red_zone > 100 || self.session.quality_floor > 100 {
            return Err(Error::Config(
                "session score thresholds must be at most 100".to_string(),
            ));
        }
        if self.telemetry.backoff_base_ms == 0
            || self.telemetry.backoff_base_ms > self.telemetry.backoff_cap_ms
        {
            return Err(Error::Config(
                "telemetry backoff base must be positive and at most the cap".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_thresholds() {
        let config = Config::default();
        assert_eq!(config.analysis.visibility_threshold, 0.3);
        assert_eq!(config.analysis.interval_ms, 100);
        assert_eq!(config.scoring.alignment_target, 180.0);
        assert_eq!(config.scoring.fallback_score, 50);
        assert_eq!(config.session.stability_window_ms, 800);
        assert_eq!(config.session.red_zone, 70);
        assert_eq!(config.telemetry.max_attempts, 5);
    }

    #[test]
    fn test_validate_rejects_bad_visibility() {
        let mut config = Config::default();
        config.analysis.visibility_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_stack_offsets() {
        let mut config = Config::default();
        config.scoring.stack_excellent_offset = 0.4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_windows() {
        let mut config = Config::default();
        config.session.stability_window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_backoff_base_above_cap() {
        let mut config = Config::default();
        config.telemetry.backoff_base_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.session.stability_window_ms = 1_200;
        config.scoring.knee_target = 165.0;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.session.stability_window_ms, 1_200);
        assert_eq!(loaded.scoring.knee_target, 165.0);
        assert_eq!(loaded.feedback.callout_period_secs, 10);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [session]
            red_zone = 75
            "#,
        )
        .unwrap();
        assert_eq!(config.session.red_zone, 75);
        assert_eq!(config.session.stability_window_ms, 800);
        assert_eq!(config.scoring.alignment_target, 180.0);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not valid toml {{{{").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
