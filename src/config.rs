use crate::logging::{parse_level, LogConfig, LogFormat, LogOutput};
use serde::{Deserialize, Serialize};
use smartpy_runtime::{Heap, HeapConfig};
use std::fs;
use std::path::Path;

/// File names looked up by `Config::discover`, in order
pub const CONFIG_FILES: [&str; 2] = ["smartpy.toml", ".smartpyrc"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub identification: IdentificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Write to daily-rotated files in this directory instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub span_events: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Budget of simultaneously live heap objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_objects: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationConfig {
    #[serde(default = "default_exp_folder")]
    pub exp_data_folder: String,

    #[serde(default = "default_num_folder")]
    pub num_data_folder: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            directory: None,
            prefix: default_prefix(),
            span_events: false,
            filter: None,
        }
    }
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            exp_data_folder: default_exp_folder(),
            num_data_folder: default_num_folder(),
        }
    }
}

fn default_level() -> String { "info".to_string() }
fn default_prefix() -> String { "smartpy".to_string() }
fn default_exp_folder() -> String { "exp_data".to_string() }
fn default_num_folder() -> String { "num_data".to_string() }

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        let output = match &self.directory {
            Some(directory) => LogOutput::File {
                directory: directory.clone(),
                prefix: self.prefix.clone(),
            },
            None => LogOutput::Stderr,
        };

        let mut config = LogConfig::new()
            .with_format(self.format)
            .with_output(output)
            .with_span_events(self.span_events);

        if let Some(level) = parse_level(&self.level) {
            config = config.with_level(level);
        }
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.clone());
        }
        config
    }
}

impl RuntimeConfig {
    pub fn heap(&self) -> Heap {
        Heap::with_config(HeapConfig {
            max_objects: self.max_objects,
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Find and load configuration from the current directory or its parents
    pub fn discover() -> Self {
        std::env::current_dir()
            .map(|dir| Self::discover_from(&dir))
            .unwrap_or_default()
    }

    /// Walk up from `start` and load the first readable config file
    pub fn discover_from(start: &Path) -> Self {
        for dir in start.ancestors() {
            for name in CONFIG_FILES {
                let config_path = dir.join(name);
                if config_path.exists() {
                    if let Ok(config) = Self::load(&config_path) {
                        return config.with_env();
                    }
                }
            }
        }

        Self::default().with_env()
    }

    /// Apply environment overrides (`SMARTPY_LOG_LEVEL`)
    pub fn with_env(mut self) -> Self {
        if let Ok(level) = std::env::var("SMARTPY_LOG_LEVEL") {
            if parse_level(&level).is_some() {
                self.logging.level = level.to_lowercase();
            }
        }
        self
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.runtime.max_objects, None);
        assert_eq!(config.identification.exp_data_folder, "exp_data");
        assert_eq!(config.identification.num_data_folder, "num_data");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"
format = "json"
directory = "logs"

[runtime]
max_objects = 64

[identification]
num_data_folder = "simul"
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.runtime.max_objects, Some(64));
        assert_eq!(config.identification.exp_data_folder, "exp_data");
        assert_eq!(config.identification.num_data_folder, "simul");

        let log = config.logging.to_log_config();
        assert_eq!(log.level, tracing::Level::DEBUG);
        assert_eq!(
            log.output,
            LogOutput::File {
                directory: "logs".into(),
                prefix: "smartpy".into()
            }
        );
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Config::parse("[runtime]\nmax_objects = \"many\"").unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let content = Config::generate_default();
        assert_eq!(Config::parse(&content).unwrap(), Config::default());
    }

    #[test]
    fn test_runtime_heap_budget() {
        let heap = RuntimeConfig { max_objects: Some(1) }.heap();
        let _list = heap.new_list(0).unwrap();
        assert!(heap.new_list(0).is_err());
    }
}
