use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::integrator::{IntegratorBackend, DEFAULT_N_CALLS};
use crate::error::{FeynmanError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Integrator generation settings
    pub generation: GenerationConfig,

    /// Template customization
    pub templates: TemplateConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Backend used when the command line does not pick one
    pub backend: IntegratorBackend,

    /// Number of integrand evaluations
    pub n_calls: u64,

    /// Trailing path components of the integrand's file to include (0 disables)
    pub source_dependency_components: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory holding `<name>.tera` overrides of the built-in templates
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub header_extension: String,
    pub source_extension: String,

    /// Prefix generated files with a "generated by" comment
    pub include_banner: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: IntegratorBackend::GslPlain,
            n_calls: DEFAULT_N_CALLS,
            source_dependency_components: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            header_extension: "h".to_string(),
            source_extension: "c".to_string(),
            include_banner: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FeynmanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FeynmanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["Feynman.toml", "feynman.toml", ".feynman.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.generation.n_calls < 1 {
            return Err(FeynmanError::Config(
                "generation.n_calls must be at least 1".to_string(),
            ));
        }
        for (key, extension) in [
            ("output.header_extension", &self.output.header_extension),
            ("output.source_extension", &self.output.source_extension),
        ] {
            if extension.is_empty() || extension.contains(['/', '\\']) {
                return Err(FeynmanError::Config(format!(
                    "{} must be a plain file extension, got {:?}",
                    key, extension
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generation.backend, IntegratorBackend::GslPlain);
        assert_eq!(config.generation.n_calls, 500_000);
        assert_eq!(config.generation.source_dependency_components, 0);
        assert!(config.templates.template_dir.is_none());
        assert_eq!(config.output.header_extension, "h");
        assert_eq!(config.output.source_extension, "c");
        assert!(config.output.include_banner);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Feynman.toml");
        std::fs::write(&path, "[generation]\nbackend = \"gsl-vegas\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.generation.backend, IntegratorBackend::GslVegas);
        assert_eq!(config.generation.n_calls, 500_000);
        assert_eq!(config.output.source_extension, "c");
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feynman.toml");

        let mut config = Config::default();
        config.generation.backend = IntegratorBackend::OpenCl;
        config.generation.source_dependency_components = 2;
        config.output.source_extension = "cpp".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.generation.backend, IntegratorBackend::OpenCl);
        assert_eq!(loaded.generation.source_dependency_components, 2);
        assert_eq!(loaded.output.source_extension, "cpp");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feynman.toml");

        std::fs::write(&path, "[generation]\nn_calls = 0\n").unwrap();
        assert!(matches!(Config::load(&path), Err(FeynmanError::Config(_))));

        std::fs::write(&path, "[generation]\nbackend = \"simpson\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(FeynmanError::Config(_))));

        std::fs::write(&path, "[output]\nheader_extension = \"\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(FeynmanError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_path_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_or_default(Some(temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.generation.n_calls, DEFAULT_N_CALLS);
    }
}
