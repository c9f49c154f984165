use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::catalog::{CatalogError, ClassCatalog, PLANT_VILLAGE_CLASSES};
use crate::pipeline::decoder::DecodeLimits;
use crate::pipeline::preprocessor::TargetSize;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid config: {0}")]
    Catalog(#[from] CatalogError),
}

/// Deployment settings shared by the CLI and the HTTP server.
///
/// Every field has a default, so a config file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// JSON network artifact loaded at startup.
    pub model_path: PathBuf,
    pub target_size: TargetSize,
    /// Class ids, index-aligned with the model's output layer.
    pub class_catalog: Vec<String>,
    pub max_batch_size: usize,
    pub batch_workers: usize,
    pub max_upload_bytes: usize,
    pub max_pixels: u64,
    pub bind_addr: String,
    pub model_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        ServiceConfig {
            model_path: PathBuf::from("models/plant_disease_model.json"),
            target_size: TargetSize::default(),
            class_catalog: PLANT_VILLAGE_CLASSES.iter().map(|s| s.to_string()).collect(),
            max_batch_size: 10,
            batch_workers: 4,
            max_upload_bytes: limits.max_bytes,
            max_pixels: limits.max_pixels,
            bind_addr: "127.0.0.1:8000".into(),
            model_version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

impl ServiceConfig {
    /// Reads and validates a JSON config file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<ServiceConfig, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServiceConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Config from `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
        match path {
            Some(p) => ServiceConfig::load_json(p),
            None => Ok(ServiceConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_size.width == 0 || self.target_size.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "target_size must be non-zero, got {}x{}",
                self.target_size.width, self.target_size.height
            )));
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid("max_batch_size must be at least 1".into()));
        }
        if self.batch_workers == 0 {
            return Err(ConfigError::Invalid("batch_workers must be at least 1".into()));
        }
        if self.max_upload_bytes == 0 || self.max_pixels == 0 {
            return Err(ConfigError::Invalid("upload limits must be non-zero".into()));
        }
        self.catalog()?;
        Ok(())
    }

    pub fn catalog(&self) -> Result<ClassCatalog, ConfigError> {
        Ok(ClassCatalog::new(self.class_catalog.iter().cloned())?)
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits { max_bytes: self.max_upload_bytes, max_pixels: self.max_pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ServiceConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog().unwrap().len(), 15);
        assert_eq!(config.target_size.input_len(), 256 * 256 * 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_batch_size": 3, "class_catalog": ["healthy", "blight"] }}"#).unwrap();

        let config = ServiceConfig::load_json(file.path()).unwrap();
        assert_eq!(config.max_batch_size, 3);
        assert_eq!(config.class_catalog, vec!["healthy", "blight"]);
        assert_eq!(config.batch_workers, 4);
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = ServiceConfig::default();
        config.max_batch_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServiceConfig::default();
        config.class_catalog = vec!["a".into(), "a".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Catalog(CatalogError::Duplicate(ref id))) if id == "a"
        ));

        let mut config = ServiceConfig::default();
        config.class_catalog.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Catalog(CatalogError::Empty))));

        let mut config = ServiceConfig::default();
        config.target_size = TargetSize::new(0, 256);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_and_malformed_files() {
        assert!(matches!(
            ServiceConfig::load_json("no/such/config.json"),
            Err(ConfigError::Io { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(ServiceConfig::load_json(file.path()), Err(ConfigError::Parse(_))));
    }
}
