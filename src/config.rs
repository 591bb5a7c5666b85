//! Configuration file parsing

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{GlucosimError, Result};
use crate::stats::DEFAULT_TREND_WINDOW;
use crate::synth::PatientArchetype;
use crate::units::TargetRange;

const DEFAULT_CONFIG: &str = "\
# glucosim configuration
# Format: key value   (text after # is ignored)

archetype normal        # normal, dawn-phenomenon, gastroparesis, athletic
seed 42
target_low 80           # mg/dL
target_high 150         # mg/dL
trend_window 3          # readings
";

/// Simulation defaults loaded from config.txt
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub archetype: PatientArchetype,
    pub seed: u64,
    pub target: TargetRange,
    pub trend_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archetype: PatientArchetype::Normal,
            seed: 42,
            target: TargetRange::default(),
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load `primary`, trying `fallback` only when `primary` does not exist.
    /// Defaults apply when neither file exists; any other error propagates.
    pub fn load_with_fallback<P: AsRef<Path>, Q: AsRef<Path>>(primary: P, fallback: Q) -> Result<Self> {
        match Self::load(&primary) {
            Err(e) if is_not_found(&e) => {
                info!("No config at {}, trying {}", primary.as_ref().display(), fallback.as_ref().display());
                match Self::load(&fallback) {
                    Err(e) if is_not_found(&e) => Ok(Config::default()),
                    other => other,
                }
            }
            other => other,
        }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut config = Config::default();
        let mut low = config.target.low();
        let mut high = config.target.high();

        for line in reader.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, rest)) = Self::parse_line(line) {
                // Extract value before any comment
                let value = rest.split('#').next().unwrap_or("").trim();
                match key {
                    "archetype" => config.archetype = value.parse()?,
                    "seed" => config.seed = parse_value(key, value)?,
                    "target_low" => low = parse_value(key, value)?,
                    "target_high" => high = parse_value(key, value)?,
                    "trend_window" => config.trend_window = parse_value(key, value)?,
                    _ => warn!("Ignoring unknown config key {:?}", key),
                }
            }
        }

        config.target = TargetRange::new(low, high)
            .map_err(|e| GlucosimError::Config(format!("target range: {e}")))?;
        if config.trend_window < 2 {
            return Err(GlucosimError::Config(format!(
                "trend_window must be at least 2 (got {})",
                config.trend_window
            )));
        }

        Ok(config)
    }

    /// Parse a single config line, returning (key, value)
    fn parse_line(line: &str) -> Option<(&str, &str)> {
        // Find first whitespace to separate key from value
        let mut parts = line.splitn(2, |c: char| c.is_whitespace());
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();

        if key.is_empty() || value.is_empty() {
            return None;
        }

        Some((key, value))
    }

    /// Write the commented default config file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        Ok(())
    }
}

fn is_not_found(err: &GlucosimError) -> bool {
    matches!(err, GlucosimError::Io(e) if e.kind() == io::ErrorKind::NotFound)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| GlucosimError::Config(format!("invalid value {value:?} for {key}")))
}

/// OS-specific directory holding glucosim files
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glucosim")
}

pub fn config_file_path() -> PathBuf {
    get_config_dir().join("config.txt")
}

/// Where exports go when no path is given
pub fn default_export_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let text = "\
# comment
archetype gastroparesis   # delayed meals
seed 7
target_low 70
target_high 180

trend_window 4
";
        let config = Config::from_reader(text.as_bytes()).unwrap();
        assert_eq!(config.archetype, PatientArchetype::Gastroparesis);
        assert_eq!(config.seed, 7);
        assert_eq!(config.target, TargetRange::new(70.0, 180.0).unwrap());
        assert_eq!(config.trend_window, 4);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::from_reader("colour blue\nseed 9\n".as_bytes()).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.archetype, PatientArchetype::Normal);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            Config::from_reader("seed minus-one\n".as_bytes()),
            Err(GlucosimError::Config(_))
        ));
        assert!(matches!(
            Config::from_reader("target_low 200\n".as_bytes()),
            Err(GlucosimError::Config(_))
        ));
        assert!(matches!(
            Config::from_reader("archetype sprinter\n".as_bytes()),
            Err(GlucosimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fallback_only_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("config.txt");
        let fallback = dir.path().join("local.txt");

        // Neither file exists
        assert_eq!(Config::load_with_fallback(&primary, &fallback).unwrap(), Config::default());

        fs::write(&fallback, "seed 11\n").unwrap();
        assert_eq!(Config::load_with_fallback(&primary, &fallback).unwrap().seed, 11);

        // A present but malformed primary is reported, not skipped
        fs::write(&primary, "target_low 200\nseed 7\n").unwrap();
        assert!(matches!(
            Config::load_with_fallback(&primary, &fallback),
            Err(GlucosimError::Config(_))
        ));

        fs::write(&primary, "seed 7\n").unwrap();
        assert_eq!(Config::load_with_fallback(&primary, &fallback).unwrap().seed, 7);
    }

    #[test]
    fn test_default_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.txt");
        Config::create_default(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
