use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Which screen edge reads as zero degrees, expressed as the shift added to `atan2`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum PhaseShift {
    #[strum(to_string = "90", serialize = "quarter")]
    Quarter,
    #[default]
    #[strum(to_string = "120", serialize = "third")]
    Third,
    #[strum(to_string = "180", serialize = "half")]
    Half,
}

impl PhaseShift {
    pub fn degrees(&self) -> f64 {
        match self {
            PhaseShift::Quarter => 90.0,
            PhaseShift::Third => 120.0,
            PhaseShift::Half => 180.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialConfig {
    pub initial_angle: f64,
    pub initial_radius: f64,
    /// Minimum angle delta, in degrees, a move must exceed to be accepted.
    #[serde(alias = "increment_by")]
    pub precision: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    /// Number of snap buckets; zero or negative means continuous.
    #[serde(alias = "steps")]
    pub sections: i64,
    /// Render unrotated regardless of the tracked angle.
    pub fixed: bool,
    /// Let the tracked radius drive the visual scale.
    pub elastic: bool,
    pub phase_shift: PhaseShift,
    /// Minimum interval between two emitted updates; zero disables throttling.
    pub throttle_ms: u64,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            initial_angle: 0.0,
            initial_radius: 1.0,
            precision: 0.0,
            radius_min: 0.0,
            radius_max: f64::INFINITY,
            sections: 0,
            fixed: false,
            elastic: false,
            phase_shift: PhaseShift::default(),
            throttle_ms: 16,
        }
    }
}

impl DialConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        let finite = [
            ("initial_angle", self.initial_angle),
            ("initial_radius", self.initial_radius),
            ("precision", self.precision),
            ("radius_min", self.radius_min),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite(*name));
        }
        if self.radius_max.is_nan() {
            return Err(ConfigError::NotFinite("radius_max"));
        }
        if self.precision < 0.0 {
            return Err(ConfigError::NegativePrecision(self.precision));
        }
        if self.radius_min > self.radius_max {
            return Err(ConfigError::RadiusBounds {
                min: self.radius_min,
                max: self.radius_max,
            });
        }
        if !(self.radius_min..=self.radius_max).contains(&self.initial_radius) {
            return Err(ConfigError::InitialRadius {
                radius: self.initial_radius,
                min: self.radius_min,
                max: self.radius_max,
            });
        }
        Ok(self)
    }

    /// Never panics, even on a config that skipped `validate`; with inverted
    /// bounds `radius_max` wins.
    pub fn clamp_radius(&self, radius: f64) -> f64 {
        radius.max(self.radius_min).min(self.radius_max)
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("precision must not be negative (got {0})")]
    NegativePrecision(f64),
    #[error("radius_min ({min}) is greater than radius_max ({max})")]
    RadiusBounds { min: f64, max: f64 },
    #[error("initial_radius {radius} is outside [{min}, {max}]")]
    InitialRadius { radius: f64, min: f64, max: f64 },
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "snapdial", "snapdial").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Result<DialConfig, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("SNAPDIAL").try_parsing(true))
        .build()?;

    s.try_deserialize::<DialConfig>()?.validate()
}

pub fn load_config() -> Result<DialConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Falls back to defaults when the file is missing or broken.
pub fn load_or_default(path: Option<&Path>) -> DialConfig {
    let loaded = match path {
        Some(p) => load_config_from(p),
        None => load_config(),
    };

    match loaded {
        Ok(c) => c,
        Err(e) => {
            log::error!("Using default dial config: {}", e);
            DialConfig::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_shift_deserialization() {
        let cases = vec![
            ("\"90\"", PhaseShift::Quarter),
            ("\"quarter\"", PhaseShift::Quarter),
            ("\"120\"", PhaseShift::Third),
            ("\"Third\"", PhaseShift::Third),
            ("\"180\"", PhaseShift::Half),
            ("\"HALF\"", PhaseShift::Half),
        ];

        for (json, expected) in cases {
            let deserialized: PhaseShift = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        assert!(serde_json::from_str::<PhaseShift>("\"45\"").is_err());
    }

    #[test]
    fn test_aliases_and_defaults() {
        let cfg: DialConfig =
            serde_json::from_str(r#"{"increment_by": 2.5, "steps": 6, "radius_max": 3.0}"#)
                .unwrap();

        assert_eq!(cfg.precision, 2.5);
        assert_eq!(cfg.sections, 6);
        assert_eq!(cfg.radius_max, 3.0);
        assert_eq!(cfg.initial_radius, 1.0);
        assert_eq!(cfg.phase_shift, PhaseShift::Third);
        assert_eq!(cfg.throttle_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_validate() {
        assert!(DialConfig::default().validate().is_ok());

        let bad_bounds = DialConfig {
            radius_min: 2.0,
            radius_max: 1.0,
            initial_radius: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad_bounds.validate(),
            Err(ConfigError::RadiusBounds { .. })
        ));

        let outside = DialConfig {
            radius_min: 0.5,
            radius_max: 2.0,
            initial_radius: 3.0,
            ..Default::default()
        };
        assert!(matches!(
            outside.validate(),
            Err(ConfigError::InitialRadius { .. })
        ));

        let negative = DialConfig {
            precision: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::NegativePrecision(_))
        ));

        let nan = DialConfig {
            initial_angle: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::NotFinite("initial_angle"))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("snapdial-config-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs_err::write(
            &path,
            "sections = 4\nradius_min = 0.5\nradius_max = 2.0\nphase_shift = \"half\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.sections, 4);
        assert_eq!(cfg.radius_min, 0.5);
        assert_eq!(cfg.radius_max, 2.0);
        assert_eq!(cfg.phase_shift, PhaseShift::Half);

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_clamp_radius_unvalidated() {
        let inverted = DialConfig {
            radius_min: 2.0,
            radius_max: 1.0,
            ..Default::default()
        };
        assert_eq!(inverted.clamp_radius(0.5), 1.0);
        assert_eq!(inverted.clamp_radius(3.0), 1.0);

        let nan_min = DialConfig {
            radius_min: f64::NAN,
            ..Default::default()
        };
        assert_eq!(nan_min.clamp_radius(1.5), 1.5);

        let bounded = DialConfig {
            radius_min: 0.5,
            radius_max: 2.0,
            ..Default::default()
        };
        assert_eq!(bounded.clamp_radius(0.1), 0.5);
        assert_eq!(bounded.clamp_radius(1.2), 1.2);
        assert_eq!(bounded.clamp_radius(9.0), 2.0);
    }

    #[test]
    fn test_bundled_default_parses() {
        let cfg: DialConfig = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.validate().unwrap(), DialConfig::default());
    }
}
