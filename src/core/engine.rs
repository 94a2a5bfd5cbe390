// src/core/engine.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use super::{
    CFile, CodeTemplates, DeclarationExtent, FunctionIntegral, GenerationOptions,
    IntegratorBackend,
};

/// Everything needed to generate one integrator
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// C file holding the integrand
    pub input: PathBuf,

    /// Name of the integrand function
    pub function: String,

    /// Output path without extension; `.h`/`.c` style extensions are appended
    pub output_base: PathBuf,

    pub integral_name: Option<String>,
    pub dependencies: Vec<String>,

    /// Overrides the header name the source includes
    pub header_include_name: Option<String>,

    pub backend: Option<IntegratorBackend>,
    pub n_calls: Option<u64>,
    pub source_dependency_components: Option<usize>,
}

impl GenerateRequest {
    pub fn new(input: impl Into<PathBuf>, function: impl Into<String>, output_base: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            function: function.into(),
            output_base: output_base.into(),
            integral_name: None,
            dependencies: Vec::new(),
            header_include_name: None,
            backend: None,
            n_calls: None,
            source_dependency_components: None,
        }
    }
}

/// Paths of the files written by [`Engine::generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub header: PathBuf,
    pub source: PathBuf,
}

/// One function declaration as reported by [`Engine::inspect`]
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationSummary {
    pub name: String,
    pub signature: String,
    pub extent: Option<DeclarationExtent>,
    pub has_body: bool,
}

/// Main orchestration engine for integrator generation
pub struct Engine {
    config: Config,
    templates: CodeTemplates,
}

impl Engine {
    /// Create a new engine from the configuration at `config_path` or the default locations
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let templates = match &config.templates.template_dir {
            Some(dir) => CodeTemplates::with_overrides(dir)
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?,
            None => CodeTemplates::builtin()?,
        };

        Ok(Self { config, templates })
    }

    /// Generate the header and source of the integral of `request.function`
    pub fn generate(&self, request: &GenerateRequest) -> Result<GeneratedFiles> {
        info!("Reading {}", request.input.display());
        let file = CFile::open(&request.input)?;

        let mut integrand = file
            .lookup(&request.function)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "No function named '{}' in {}",
                    request.function,
                    request.input.display()
                )
            })?;
        debug!("Integrand: {}", integrand.signature());

        let mut integral = FunctionIntegral::derive(&integrand, request.integral_name.as_deref())?;

        for dependency in &request.dependencies {
            integral.add_include_dependency(dependency)?;
        }

        let components = request
            .source_dependency_components
            .unwrap_or(self.config.generation.source_dependency_components);
        if components > 0 {
            integrand.add_source_file_dependency(components)?;
            for dependency in integrand.include_dependencies() {
                integral.add_include_dependency(dependency)?;
            }
        }

        let header_path = with_extension_appended(&request.output_base, &self.config.output.header_extension);
        let source_path = with_extension_appended(&request.output_base, &self.config.output.source_extension);

        let header_include_name = match &request.header_include_name {
            Some(name) => name.clone(),
            None => header_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow!("Invalid output base: {}", request.output_base.display()))?,
        };

        let mut options = GenerationOptions::new(header_include_name)?
            .with_n_calls(request.n_calls.unwrap_or(self.config.generation.n_calls))?;
        if self.config.output.include_banner {
            options = options.with_banner(format!(
                "Generated by genint {} on {}",
                env!("CARGO_PKG_VERSION"),
                chrono::Utc::now().to_rfc3339()
            ));
        }

        let backend = request.backend.unwrap_or(self.config.generation.backend);
        info!("Generating {} with the {} backend", integral.signature(), backend.name());

        let integrator = backend.create(integral);
        let code = integrator.generate_code(&self.templates, &options)?;

        if let Some(parent) = header_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&header_path, code.header)
            .with_context(|| format!("Failed to write {}", header_path.display()))?;
        std::fs::write(&source_path, code.source)
            .with_context(|| format!("Failed to write {}", source_path.display()))?;

        info!("Wrote {}", header_path.display());
        info!("Wrote {}", source_path.display());

        Ok(GeneratedFiles {
            header: header_path,
            source: source_path,
        })
    }

    /// Summarize every function declared in `path`
    pub fn inspect(&self, path: &Path) -> Result<Vec<DeclarationSummary>> {
        let file = CFile::open(path)?;
        info!("Found {} function declarations in {}", file.function_declarations().len(), path.display());

        Ok(file
            .function_declarations()
            .iter()
            .map(|declaration| DeclarationSummary {
                name: declaration.name().to_string(),
                signature: declaration.signature(),
                extent: declaration.extent(),
                has_body: declaration.has_body(),
            })
            .collect())
    }
}

/// `out/area` + `h` gives `out/area.h`, keeping any dots already in the base
fn with_extension_appended(base: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}
