//! Integrator code generation
//!
//! An integrator turns a [`FunctionIntegral`] into a C header and source that
//! implement it. Backends are picked from the closed [`IntegratorBackend`] set.

mod gsl;
mod opencl;

pub use gsl::{GslAlgorithm, GslMonteCarloIntegrator};
pub use opencl::OpenClMonteCarloIntegrator;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tera::Context;

use crate::error::{FeynmanError, Result};
use super::identifier::validate_identifier;
use super::integral::FunctionIntegral;
use super::templates::CodeTemplates;

/// Default number of integrand evaluations
pub const DEFAULT_N_CALLS: u64 = 500_000;

/// Rendered output of an integrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub header: String,
    pub source: String,
}

/// Settings that shape the generated files
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// What appears between the quotes of the source's self-include
    pub header_include_name: String,
    pub include_guard: String,
    pub n_calls: u64,
    pub banner: Option<String>,
}

impl GenerationOptions {
    pub fn new(header_include_name: impl Into<String>) -> Result<Self> {
        let header_include_name = header_include_name.into();
        if header_include_name.trim().is_empty() {
            return Err(FeynmanError::Validation(
                "The header include name must not be empty".to_string(),
            ));
        }

        let include_guard = include_guard_for(&header_include_name);
        validate_identifier(&include_guard)?;

        Ok(Self {
            header_include_name,
            include_guard,
            n_calls: DEFAULT_N_CALLS,
            banner: None,
        })
    }

    pub fn with_n_calls(mut self, n_calls: u64) -> Result<Self> {
        if n_calls < 1 {
            return Err(FeynmanError::Validation(
                "The number of calls must be at least one".to_string(),
            ));
        }
        self.n_calls = n_calls;
        Ok(self)
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }
}

/// `integrals/area.h` becomes `INTEGRALS_AREA_H`
pub fn include_guard_for(header_include_name: &str) -> String {
    let guard: String = header_include_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    let guard = guard.trim_start_matches('_');

    if guard.starts_with(|c: char| c.is_ascii_digit()) {
        format!("H_{}", guard)
    } else {
        guard.to_string()
    }
}

/// A code generator for one integral
pub trait FunctionIntegrator {
    fn integral(&self) -> &FunctionIntegral;

    /// Render the header and source implementing the integral
    fn generate_code(&self, templates: &CodeTemplates, options: &GenerationOptions) -> Result<GeneratedCode>;
}

/// The available integrator backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorBackend {
    GslPlain,
    GslMiser,
    GslVegas,
    #[serde(rename = "opencl")]
    #[value(name = "opencl")]
    OpenCl,
}

impl IntegratorBackend {
    pub fn create(self, integral: FunctionIntegral) -> Box<dyn FunctionIntegrator> {
        match self {
            IntegratorBackend::GslPlain => {
                Box::new(GslMonteCarloIntegrator::new(integral, GslAlgorithm::Plain))
            }
            IntegratorBackend::GslMiser => {
                Box::new(GslMonteCarloIntegrator::new(integral, GslAlgorithm::Miser))
            }
            IntegratorBackend::GslVegas => {
                Box::new(GslMonteCarloIntegrator::new(integral, GslAlgorithm::Vegas))
            }
            IntegratorBackend::OpenCl => Box::new(OpenClMonteCarloIntegrator::new(integral)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntegratorBackend::GslPlain => "gsl-plain",
            IntegratorBackend::GslMiser => "gsl-miser",
            IntegratorBackend::GslVegas => "gsl-vegas",
            IntegratorBackend::OpenCl => "opencl",
        }
    }
}

/// Template data describing an integral
fn integral_data(integral: &FunctionIntegral) -> Value {
    let integrand = integral.integrand();
    json!({
        "name": integral.name(),
        "return_type": integral.return_type(),
        "signature": integral.signature(),
        "signature_with_defaults": integral.signature_with_defaults(),
        "argument_types": integral.argument_types(),
        "argument_names": integral.argument_names(),
        "n_dimensions": integral.n_dimensions(),
        "lower_bounds": integral.lower_bound_names(),
        "upper_bounds": integral.upper_bound_names(),
        "include_dependencies": integral.include_dependencies(),
        "integrand": {
            "name": integrand.name(),
            "return_type": integrand.return_type(),
            "argument_types": integrand.argument_types(),
            "signature": integrand.signature(),
        },
    })
}

/// Context shared by every backend's templates
fn base_context(integral: &FunctionIntegral, options: &GenerationOptions) -> Result<Context> {
    if integral.n_dimensions() == 0 {
        return Err(FeynmanError::Validation(format!(
            "Cannot integrate '{}': the integrand takes no arguments",
            integral.integrand().name()
        )));
    }

    let mut context = Context::new();
    context.insert("integral", &integral_data(integral));
    context.insert("header_include_name", &options.header_include_name);
    context.insert("include_guard", &options.include_guard);
    context.insert("n_calls", &options.n_calls);
    context.insert("banner", options.banner.as_deref().unwrap_or(""));
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::declaration::FunctionDeclaration;

    pub(super) fn area_integral() -> FunctionIntegral {
        let area = FunctionDeclaration::new(
            "area",
            "double",
            vec!["double".to_string()],
            vec!["radius".to_string()],
        )
        .unwrap();
        let mut integral = FunctionIntegral::derive(&area, None).unwrap();
        integral.add_include_dependency("area.h").unwrap();
        integral
    }

    #[test]
    fn test_include_guards() {
        assert_eq!(include_guard_for("area_integral.h"), "AREA_INTEGRAL_H");
        assert_eq!(include_guard_for("integrals/integral1.h"), "INTEGRALS_INTEGRAL1_H");
        assert_eq!(include_guard_for("../2d.h"), "H_2D_H");
    }

    #[test]
    fn test_options_validation() {
        assert!(GenerationOptions::new("").unwrap_err().is_validation());
        assert!(GenerationOptions::new("a.h").unwrap().with_n_calls(0).unwrap_err().is_validation());
        assert_eq!(GenerationOptions::new("a.h").unwrap().n_calls, DEFAULT_N_CALLS);
    }

    #[test]
    fn test_header_declares_integral_for_c_and_cpp() {
        let templates = CodeTemplates::builtin().unwrap();
        let options = GenerationOptions::new("area_integral.h").unwrap();
        let code = IntegratorBackend::GslPlain
            .create(area_integral())
            .generate_code(&templates, &options)
            .unwrap();

        assert!(code.header.contains("#ifndef AREA_INTEGRAL_H"));
        assert!(code
            .header
            .contains("double area_integral(double radius_min, double radius_max, double * error = NULL);"));
        assert!(code
            .header
            .contains("double area_integral(double radius_min, double radius_max, double * error);"));
    }

    #[test]
    fn test_zero_dimension_integrals_are_rejected() {
        let constant = FunctionDeclaration::new("constant", "double", vec![], vec![]).unwrap();
        let integral = FunctionIntegral::derive(&constant, None).unwrap();
        let templates = CodeTemplates::builtin().unwrap();
        let options = GenerationOptions::new("constant.h").unwrap();

        let err = IntegratorBackend::GslVegas
            .create(integral)
            .generate_code(&templates, &options)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_backend_names() {
        let parsed: IntegratorBackend = serde_json::from_str("\"opencl\"").unwrap();
        assert_eq!(parsed, IntegratorBackend::OpenCl);
        let parsed: IntegratorBackend = serde_json::from_str("\"gsl-miser\"").unwrap();
        assert_eq!(parsed.name(), "gsl-miser");
        assert_eq!(
            IntegratorBackend::from_str("gsl-vegas", false).unwrap(),
            IntegratorBackend::GslVegas
        );
    }
}
