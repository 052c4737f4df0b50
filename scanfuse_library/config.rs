//! Pipeline configuration
//!
//! Loaded once at startup from YAML or TOML. Every section and field has a
//! default, so an empty document is a valid configuration.
//!
//! ```yaml
//! grid:
//!   width: 20
//!   height: 20
//!   resolution: 0.15
//! stability:
//!   window_size: 3
//!   max_error_orientation: 0.05
//! sources:
//!   fix_interval_ms: 1000
//!   scan_min_interval_ms: 500
//! scheduler:
//!   tick_rate_hz: 60.0
//! ```

use crate::algorithms::fusion::FusionPipeline;
use crate::algorithms::occupancy_grid::GridConfig;
use crate::algorithms::stability_window::StabilityConfig;
use crate::messages::geometry::Pose2D;
use scanfuse_core::error::{ScanfuseError, ScanfuseResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sensor source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Period of position-fix polling
    pub fix_interval_ms: u64,
    /// Minimum time between two delivered scans
    pub scan_min_interval_ms: u64,
    /// Undelivered scans kept; 1 keeps only the newest
    pub scan_queue_depth: usize,
    pub fix_queue_depth: usize,
    /// Replay fixes from a JSON array instead of simulating them
    pub fix_replay: Option<PathBuf>,
    pub simulation: SimulationConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fix_interval_ms: 1000,
            scan_min_interval_ms: 500,
            scan_queue_depth: 1,
            fix_queue_depth: 16,
            fix_replay: None,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Simulated robot and room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// True pose of the simulated robot
    pub robot_pose: Pose2D,
    /// Half-width of the uniform noise added to simulated fixes
    pub fix_jitter: f64,
    /// Every n-th fix jumps away from the true pose
    pub jump_every: Option<u64>,
    pub jump_distance: f64,
    /// Room extent along x, centred on the origin
    pub room_width: f64,
    /// Room extent along y, centred on the origin
    pub room_height: f64,
    pub beam_count: usize,
    pub max_range: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            robot_pose: Pose2D::from_xy(0.3, 0.3, 0.0),
            fix_jitter: 0.0005,
            jump_every: Some(7),
            jump_distance: 0.5,
            room_width: 2.4,
            room_height: 2.4,
            beam_count: 180,
            max_range: 4.0,
        }
    }
}

/// Topic names the nodes talk over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub fix: String,
    pub scan: String,
    pub stability: String,
    pub frame: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            fix: "gps/fix".to_string(),
            scan: "scan".to_string(),
            stability: "stability".to_string(),
            frame: "map/frame".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Global loop rate
    pub tick_rate_hz: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 60.0 }
    }
}

/// Complete configuration of a mapping run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub grid: GridConfig,
    pub stability: StabilityConfig,
    pub sources: SourceConfig,
    pub topics: TopicConfig,
    pub initial_pose: Pose2D,
    pub scheduler: SchedulerConfig,
}

impl FusionConfig {
    /// Load from a `.yaml`/`.yml` or `.toml` file and validate
    pub fn from_file(path: impl AsRef<Path>) -> ScanfuseResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            _ => Err(ScanfuseError::config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml_str(text: &str) -> ScanfuseResult<Self> {
        // An empty YAML document deserializes to null, not to an empty map
        let config: FusionConfig = if text.trim().is_empty() {
            FusionConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> ScanfuseResult<Self> {
        let config: FusionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> ScanfuseResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject geometry and thresholds the pipeline cannot work with
    pub fn validate(&self) -> ScanfuseResult<()> {
        let grid = &self.grid;
        if grid.width == 0 || grid.height == 0 {
            return Err(ScanfuseError::config(format!(
                "grid dimensions must be non-zero, got {}x{}",
                grid.width, grid.height
            )));
        }
        if !grid.resolution.is_finite() || grid.resolution <= 0.0 {
            return Err(ScanfuseError::config(format!(
                "grid resolution must be positive, got {}",
                grid.resolution
            )));
        }
        if grid.max_confidence == 0 {
            return Err(ScanfuseError::config("grid max_confidence must be non-zero"));
        }

        let stability = &self.stability;
        if stability.window_size == 0 {
            return Err(ScanfuseError::config("stability window_size must be non-zero"));
        }
        if !stability.scale.is_finite() || stability.scale <= 0.0 {
            return Err(ScanfuseError::config(format!(
                "stability scale must be positive, got {}",
                stability.scale
            )));
        }
        let thresholds = [
            ("max_error_x", Some(stability.max_error_x)),
            ("max_error_y_low", Some(stability.max_error_y_low)),
            ("max_error_y_high", Some(stability.max_error_y_high)),
            ("max_error_orientation", stability.max_error_orientation),
        ];
        for (name, value) in thresholds {
            if let Some(value) = value {
                if value.is_nan() || value < 0.0 {
                    return Err(ScanfuseError::config(format!(
                        "stability {} must be non-negative, got {}",
                        name, value
                    )));
                }
            }
        }

        let sources = &self.sources;
        if sources.fix_interval_ms == 0 {
            return Err(ScanfuseError::config("sources fix_interval_ms must be non-zero"));
        }
        if sources.scan_queue_depth == 0 || sources.fix_queue_depth == 0 {
            return Err(ScanfuseError::config("sources queue depths must be non-zero"));
        }
        let sim = &sources.simulation;
        if sim.beam_count == 0 || !(sim.max_range > 0.0) {
            return Err(ScanfuseError::config(
                "simulated scans need at least one beam and a positive max_range",
            ));
        }
        if !(sim.room_width > 0.0) || !(sim.room_height > 0.0) {
            return Err(ScanfuseError::config("simulated room must have positive extent"));
        }
        if !sim.robot_pose.is_finite() {
            return Err(ScanfuseError::config("simulated robot_pose must be finite"));
        }

        if !self.initial_pose.is_finite() {
            return Err(ScanfuseError::config("initial_pose must be finite"));
        }

        let rate = self.scheduler.tick_rate_hz;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ScanfuseError::config(format!(
                "scheduler tick_rate_hz must be positive, got {}",
                rate
            )));
        }
        Ok(())
    }

    /// Fix node rate derived from the polling interval
    pub fn fix_rate_hz(&self) -> f64 {
        1000.0 / self.sources.fix_interval_ms as f64
    }

    /// Fresh pipeline with this configuration
    pub fn build_pipeline(&self) -> FusionPipeline {
        FusionPipeline::new(&self.grid, self.stability, self.initial_pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = FusionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.width, 20);
        assert_eq!(config.stability.window_size, 3);
        assert_eq!(config.sources.scan_queue_depth, 1);
        assert_relative_eq!(config.fix_rate_hz(), 1.0);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "grid:\n  width: 40\nstability:\n  max_error_orientation: 0.2\n";
        let config = FusionConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.grid.width, 40);
        assert_eq!(config.grid.height, 20);
        assert_eq!(config.stability.max_error_orientation, Some(0.2));
        assert_relative_eq!(config.stability.max_error_y_high, 5.0);
        assert_eq!(config.topics.scan, "scan");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(FusionConfig::from_yaml_str("").unwrap(), FusionConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = FusionConfig::default();
        config.initial_pose = Pose2D::from_xy(0.5, -0.5, 1.0);
        config.sources.simulation.jump_every = None;

        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(FusionConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_toml() {
        let toml = "[grid]\nresolution = 0.25\n\n[scheduler]\ntick_rate_hz = 20.0\n";
        let config = FusionConfig::from_toml_str(toml).unwrap();
        assert_relative_eq!(config.grid.resolution, 0.25);
        assert_relative_eq!(config.scheduler.tick_rate_hz, 20.0);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        assert!(FusionConfig::from_yaml_str("grid:\n  width: 0\n").is_err());
        assert!(FusionConfig::from_yaml_str("grid:\n  resolution: 0.0\n").is_err());
        assert!(FusionConfig::from_yaml_str("grid:\n  resolution: -1.0\n").is_err());
        assert!(FusionConfig::from_yaml_str("grid:\n  max_confidence: 0\n").is_err());
        assert!(FusionConfig::from_yaml_str("stability:\n  window_size: 0\n").is_err());
        assert!(FusionConfig::from_yaml_str("stability:\n  max_error_x: -0.1\n").is_err());
        assert!(FusionConfig::from_yaml_str("scheduler:\n  tick_rate_hz: 0.0\n").is_err());
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        let err = FusionConfig::from_yaml_str("grid: [1, 2").unwrap_err();
        assert!(matches!(err, ScanfuseError::Serialization(_)));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("fusion.yaml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(file, "grid:\n  width: 30").unwrap();
        assert_eq!(FusionConfig::from_file(&yaml_path).unwrap().grid.width, 30);

        let toml_path = dir.path().join("fusion.toml");
        std::fs::write(&toml_path, "[grid]\nheight = 12\n").unwrap();
        assert_eq!(FusionConfig::from_file(&toml_path).unwrap().grid.height, 12);

        let other = dir.path().join("fusion.ini");
        std::fs::write(&other, "").unwrap();
        assert!(matches!(
            FusionConfig::from_file(&other),
            Err(ScanfuseError::Config(_))
        ));

        assert!(matches!(
            FusionConfig::from_file(dir.path().join("missing.yaml")),
            Err(ScanfuseError::Io(_))
        ));
    }

    #[test]
    fn test_build_pipeline() {
        let config = FusionConfig::from_yaml_str("grid:\n  width: 8\n  height: 6\n").unwrap();
        let pipeline = config.build_pipeline();
        assert_eq!(pipeline.grid().dimensions(), (8, 6));
        assert_eq!(pipeline.window().window_size(), 3);
    }
}
