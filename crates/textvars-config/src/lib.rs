use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use textvars_engine::DocumentSettings;
use textvars_engine::debounce::SELECTION_DEBOUNCE_MS;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Document fixture opened when none is given on the command line
    pub document_path: PathBuf,
    /// Variable store fixture; defaults to `<document stem>.vars.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables_path: Option<PathBuf>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_collection")]
    pub default_collection: String,
    #[serde(default = "default_icon_font_family")]
    pub icon_font_family: String,
    #[serde(default = "default_icon_font_style")]
    pub icon_font_style: String,
}

fn default_debounce_ms() -> u64 {
    SELECTION_DEBOUNCE_MS
}

fn default_enabled() -> bool {
    true
}

fn default_collection() -> String {
    DocumentSettings::default().collection_name
}

fn default_icon_font_family() -> String {
    DocumentSettings::default().icon_font_family
}

fn default_icon_font_style() -> String {
    DocumentSettings::default().icon_font_style
}

impl Config {
    /// Config for `document_path` with every other field at its default.
    pub fn new(document_path: PathBuf) -> Self {
        let defaults = DocumentSettings::default();
        Self {
            document_path,
            variables_path: None,
            debounce_ms: default_debounce_ms(),
            enabled: default_enabled(),
            default_collection: defaults.collection_name,
            icon_font_family: defaults.icon_font_family,
            icon_font_style: defaults.icon_font_style,
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        config.document_path =
            Self::expand_path(&config.document_path).unwrap_or(config.document_path);
        config.variables_path = config
            .variables_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/textvars");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The configured variables file, or `<stem>.vars.json` beside the document.
    pub fn variables_path(&self) -> PathBuf {
        self.variables_path
            .clone()
            .unwrap_or_else(|| Self::sibling_variables_path(&self.document_path))
    }

    pub fn sibling_variables_path(document_path: &Path) -> PathBuf {
        let stem = document_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        document_path.with_file_name(format!("{stem}.vars.json"))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Settings used when a document has none of its own.
    pub fn document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            collection_name: self.default_collection.clone(),
            icon_font_family: self.icon_font_family.clone(),
            icon_font_style: self.icon_font_style.clone(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/textvars/config.toml"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(r#"document_path = "/tmp/card.json""#).unwrap();

        assert_eq!(config, Config::new(PathBuf::from("/tmp/card.json")));
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert!(config.enabled);
        assert_eq!(config.document_settings(), DocumentSettings::default());
    }

    #[test]
    fn test_variables_path_defaults_beside_document() {
        let mut config = Config::new(PathBuf::from("/work/designs/card.json"));
        assert_eq!(
            config.variables_path(),
            PathBuf::from("/work/designs/card.vars.json")
        );

        config.variables_path = Some(PathBuf::from("/shared/vars.json"));
        assert_eq!(config.variables_path(), PathBuf::from("/shared/vars.json"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "document_path = ").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            variables_path: Some(PathBuf::from("/tmp/vars.json")),
            debounce_ms: 50,
            enabled: false,
            default_collection: "Brand".to_string(),
            ..Config::new(PathBuf::from("/tmp/card.json"))
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        unsafe {
            env::set_var("TEXTVARS_ROOT", "/custom/designs");
        }
        std::fs::write(
            &config_file,
            r#"
document_path = "$TEXTVARS_ROOT/card.json"
variables_path = "$TEXTVARS_ROOT/shared.vars.json"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.document_path, PathBuf::from("/custom/designs/card.json"));
        assert_eq!(
            config.variables_path(),
            PathBuf::from("/custom/designs/shared.vars.json")
        );

        unsafe {
            env::remove_var("TEXTVARS_ROOT");
        }
    }
}
