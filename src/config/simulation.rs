use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f32,
    #[serde(default = "default_growth_rate")]
    pub growth_rate: u8,
    #[serde(default = "default_tutorial_growth_rate")]
    pub tutorial_growth_rate: u8,
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u32,
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: f32,
    #[serde(default = "default_save_directory")]
    pub save_directory: String,
    #[serde(default = "default_max_saves")]
    pub max_saves: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 0 picks a random seed at startup.
    #[serde(default)]
    pub rng_seed: u64,
    /// Empty runs fully offline on the local generator.
    #[serde(default)]
    pub content_endpoint: String,
    #[serde(default = "default_content_timeout_ms")]
    pub content_timeout_ms: u64,
    #[serde(default = "default_customer_delay_min_ms")]
    pub customer_delay_min_ms: u64,
    #[serde(default = "default_customer_delay_max_ms")]
    pub customer_delay_max_ms: u64,
}

fn default_tick_rate() -> f32 {
    1.0
}
fn default_growth_rate() -> u8 {
    5
}
fn default_tutorial_growth_rate() -> u8 {
    20
}
fn default_ticks_per_day() -> u32 {
    120
}
fn default_autosave_interval() -> f32 {
    5.0
}
fn default_save_directory() -> String {
    "./saves".to_string()
}
fn default_max_saves() -> u32 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_content_timeout_ms() -> u64 {
    3000
}
fn default_customer_delay_min_ms() -> u64 {
    3000
}
fn default_customer_delay_max_ms() -> u64 {
    8000
}

/// `None` when `secs` overflows a `Duration` or rounds down to zero.
fn positive_duration(secs: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(secs).ok().filter(|d| !d.is_zero())
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_rate_hz: default_tick_rate(),
            growth_rate: default_growth_rate(),
            tutorial_growth_rate: default_tutorial_growth_rate(),
            ticks_per_day: default_ticks_per_day(),
            autosave_interval_secs: default_autosave_interval(),
            save_directory: default_save_directory(),
            max_saves: default_max_saves(),
            log_level: default_log_level(),
            rng_seed: 0,
            content_endpoint: String::new(),
            content_timeout_ms: default_content_timeout_ms(),
            customer_delay_min_ms: default_customer_delay_min_ms(),
            customer_delay_max_ms: default_customer_delay_max_ms(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    /// Like [`from_file`](Self::from_file), but a missing file means defaults.
    /// A file that exists and is invalid is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Period of the simulation clock.
    pub fn tick_interval(&self) -> Result<Duration, String> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(format!(
                "tick_rate_hz must be a finite number > 0.0, got {}. Example: tick_rate_hz = 1.0",
                self.tick_rate_hz
            ));
        }
        positive_duration(1.0 / self.tick_rate_hz).ok_or_else(|| {
            format!(
                "tick_rate_hz {} gives an unusable tick period. Example: tick_rate_hz = 1.0",
                self.tick_rate_hz
            )
        })
    }

    pub fn autosave_interval(&self) -> Result<Duration, String> {
        if !(self.autosave_interval_secs.is_finite() && self.autosave_interval_secs > 0.0) {
            return Err(format!(
                "autosave_interval_secs must be a finite number > 0.0, got {}. Example: autosave_interval_secs = 5.0",
                self.autosave_interval_secs
            ));
        }
        positive_duration(self.autosave_interval_secs).ok_or_else(|| {
            format!(
                "autosave_interval_secs {} is out of range. Example: autosave_interval_secs = 5.0",
                self.autosave_interval_secs
            )
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if let Err(e) = self.tick_interval() {
            errors.push(e);
        }

        if self.growth_rate == 0 || self.growth_rate > 100 {
            errors.push(format!(
                "growth_rate must be 1-100, got {}. Example: growth_rate = 5",
                self.growth_rate
            ));
        }

        if self.tutorial_growth_rate == 0 || self.tutorial_growth_rate > 100 {
            errors.push(format!(
                "tutorial_growth_rate must be 1-100, got {}. Example: tutorial_growth_rate = 20",
                self.tutorial_growth_rate
            ));
        }

        if self.ticks_per_day == 0 {
            errors.push(format!(
                "ticks_per_day must be > 0, got {}. Example: ticks_per_day = 120",
                self.ticks_per_day
            ));
        }

        if let Err(e) = self.autosave_interval() {
            errors.push(e);
        }

        if self.max_saves == 0 {
            errors.push(format!(
                "max_saves must be > 0, got {}. Example: max_saves = 5",
                self.max_saves
            ));
        }

        if self.content_timeout_ms == 0 {
            errors.push(format!(
                "content_timeout_ms must be > 0, got {}. Example: content_timeout_ms = 3000",
                self.content_timeout_ms
            ));
        }

        if self.customer_delay_min_ms > self.customer_delay_max_ms {
            errors.push(format!(
                "customer_delay_min_ms ({}) must not exceed customer_delay_max_ms ({}). Example: customer_delay_min_ms = 3000",
                self.customer_delay_min_ms, self.customer_delay_max_ms
            ));
        }

        let endpoint = self.content_endpoint.trim();
        if !endpoint.is_empty() && !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            errors.push(format!(
                "content_endpoint must be an http(s) URL or empty, got '{}'. Example: content_endpoint = \"http://localhost:3000/api/content\"",
                self.content_endpoint
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn test_path() -> PathBuf {
        PathBuf::from("test-config.toml")
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            tick_rate_hz = 2.0
            growth_rate = 10
            tutorial_growth_rate = 25
            ticks_per_day = 60
            autosave_interval_secs = 1.5
            save_directory = "./data/saves"
            max_saves = 3
            log_level = "debug"
            rng_seed = 1234
            content_endpoint = "http://localhost:3000/api/content"
            content_timeout_ms = 1000
            customer_delay_min_ms = 100
            customer_delay_max_ms = 200
        "#;
        let config = SimulationConfig::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(config.tick_rate_hz, 2.0);
        assert_eq!(config.growth_rate, 10);
        assert_eq!(config.tutorial_growth_rate, 25);
        assert_eq!(config.ticks_per_day, 60);
        assert_eq!(config.autosave_interval_secs, 1.5);
        assert_eq!(config.save_directory, "./data/saves");
        assert_eq!(config.max_saves, 3);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rng_seed, 1234);
        assert_eq!(config.content_endpoint, "http://localhost:3000/api/content");
        assert_eq!(config.content_timeout_ms, 1000);
        assert_eq!(config.customer_delay_min_ms, 100);
        assert_eq!(config.customer_delay_max_ms, 200);
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let config = SimulationConfig::from_toml_str("", &test_path()).unwrap();
        assert_eq!(config.tick_rate_hz, 1.0);
        assert_eq!(config.growth_rate, 5);
        assert_eq!(config.tutorial_growth_rate, 20);
        assert_eq!(config.ticks_per_day, 120);
        assert_eq!(config.autosave_interval_secs, 5.0);
        assert_eq!(config.save_directory, "./saves");
        assert_eq!(config.max_saves, 5);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.rng_seed, 0);
        assert!(config.content_endpoint.is_empty());
        assert_eq!(config.content_timeout_ms, 3000);
        assert_eq!(config.customer_delay_min_ms, 3000);
        assert_eq!(config.customer_delay_max_ms, 8000);
    }

    #[test]
    fn default_impl_matches_serde_defaults() {
        let parsed = SimulationConfig::from_toml_str("", &test_path()).unwrap();
        let built = SimulationConfig::default();
        assert_eq!(format!("{:?}", parsed), format!("{:?}", built));
    }

    #[test]
    fn invalid_tick_rate_rejected() {
        let err = SimulationConfig::from_toml_str("tick_rate_hz = -1.0", &test_path()).unwrap_err();
        assert!(err.contains("tick_rate_hz"));
        assert!(err.contains("> 0.0"));
    }

    #[test]
    fn non_finite_tick_rate_rejected() {
        for value in ["nan", "inf", "-inf"] {
            let toml = format!("tick_rate_hz = {}", value);
            let err = SimulationConfig::from_toml_str(&toml, &test_path()).unwrap_err();
            assert!(err.contains("tick_rate_hz"), "{}", value);
        }
    }

    #[test]
    fn tick_rate_with_unusable_period_rejected() {
        // 1 / 1e-40 overflows f32; 1 / 1e38 rounds to a zero Duration.
        for value in ["1e-40", "1e38"] {
            let toml = format!("tick_rate_hz = {}", value);
            let err = SimulationConfig::from_toml_str(&toml, &test_path()).unwrap_err();
            assert!(err.contains("tick_rate_hz"), "{}", value);
        }
    }

    #[test]
    fn autosave_interval_out_of_range_rejected() {
        for value in ["nan", "1e30", "0.0"] {
            let toml = format!("autosave_interval_secs = {}", value);
            let err = SimulationConfig::from_toml_str(&toml, &test_path()).unwrap_err();
            assert!(err.contains("autosave_interval_secs"), "{}", value);
        }
    }

    #[test]
    fn intervals_follow_config() {
        let config = SimulationConfig::from_toml_str(
            "tick_rate_hz = 4.0\nautosave_interval_secs = 2.5",
            &test_path(),
        )
        .unwrap();
        assert_eq!(config.tick_interval().unwrap(), Duration::from_millis(250));
        assert_eq!(config.autosave_interval().unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn invalid_growth_rate_rejected() {
        let err = SimulationConfig::from_toml_str("growth_rate = 0", &test_path()).unwrap_err();
        assert!(err.contains("growth_rate"));
        assert!(err.contains("1-100"));
    }

    #[test]
    fn inverted_customer_delay_rejected() {
        let toml = "customer_delay_min_ms = 9000\ncustomer_delay_max_ms = 1000";
        let err = SimulationConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("customer_delay_min_ms"));
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let err = SimulationConfig::from_toml_str(r#"content_endpoint = "ftp://x""#, &test_path())
            .unwrap_err();
        assert!(err.contains("content_endpoint"));
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err =
            SimulationConfig::from_toml_str(r#"log_level = "verbose""#, &test_path()).unwrap_err();
        assert!(err.contains("log_level"));
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "tick_rate_hz = 0.0\nmax_saves = 0\nticks_per_day = 0";
        let err = SimulationConfig::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.contains("tick_rate_hz"));
        assert!(err.contains("max_saves"));
        assert!(err.contains("ticks_per_day"));
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err =
            SimulationConfig::from_toml_str("tick_rate_hz = [invalid", &test_path()).unwrap_err();
        assert!(err.contains("test-config.toml"));
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(tmp, "growth_rate = 7").unwrap();
        let config = SimulationConfig::from_file(tmp.path()).unwrap();
        assert_eq!(config.growth_rate, 7);
    }

    #[test]
    fn from_file_missing_file_error() {
        let err = SimulationConfig::from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.contains("Cannot read"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SimulationConfig::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.max_saves, 5);
    }
}
