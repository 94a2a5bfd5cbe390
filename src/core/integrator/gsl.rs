use tracing::debug;

use crate::error::Result;
use super::{base_context, FunctionIntegrator, GeneratedCode, GenerationOptions};
use crate::core::integral::FunctionIntegral;
use crate::core::templates::CodeTemplates;

/// Calls spent adapting the VEGAS grid before the converging runs
const VEGAS_WARMUP_CALLS: u64 = 10_000;

/// GSL Monte Carlo algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GslAlgorithm {
    Plain,
    Miser,
    Vegas,
}

impl GslAlgorithm {
    /// Suffix of the GSL header and function names
    pub fn name(&self) -> &'static str {
        match self {
            GslAlgorithm::Plain => "plain",
            GslAlgorithm::Miser => "miser",
            GslAlgorithm::Vegas => "vegas",
        }
    }
}

/// Integrator backed by the GSL Monte Carlo routines
pub struct GslMonteCarloIntegrator {
    integral: FunctionIntegral,
    algorithm: GslAlgorithm,
}

impl GslMonteCarloIntegrator {
    pub fn new(integral: FunctionIntegral, algorithm: GslAlgorithm) -> Self {
        Self { integral, algorithm }
    }
}

impl FunctionIntegrator for GslMonteCarloIntegrator {
    fn integral(&self) -> &FunctionIntegral {
        &self.integral
    }

    fn generate_code(&self, templates: &CodeTemplates, options: &GenerationOptions) -> Result<GeneratedCode> {
        let mut context = base_context(&self.integral, options)?;
        context.insert("algorithm", self.algorithm.name());
        context.insert("vegas_warmup_calls", &VEGAS_WARMUP_CALLS);

        debug!(
            "Rendering GSL {} integrator for {}",
            self.algorithm.name(),
            self.integral.name()
        );

        Ok(GeneratedCode {
            header: templates.render("integral.h", &context)?,
            source: templates.render("gsl_monte_carlo.c", &context)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::declaration::FunctionDeclaration;
    use crate::core::integrator::tests::area_integral;

    fn render(algorithm: GslAlgorithm) -> GeneratedCode {
        let templates = CodeTemplates::builtin().unwrap();
        let options = GenerationOptions::new("area_integral.h")
            .unwrap()
            .with_n_calls(1000)
            .unwrap();
        GslMonteCarloIntegrator::new(area_integral(), algorithm)
            .generate_code(&templates, &options)
            .unwrap()
    }

    #[test]
    fn test_plain_source() {
        let code = render(GslAlgorithm::Plain);

        assert!(code.source.contains("#include \"area_integral.h\""));
        assert!(code.source.contains("#include <gsl/gsl_monte_plain.h>"));
        assert!(code.source.contains("#include \"area.h\""));
        assert!(code.source.contains("return area(x[0]);"));
        assert!(code.source.contains("double lower_bounds[1] = { radius_min };"));
        assert!(code.source.contains("double upper_bounds[1] = { radius_max };"));
        assert!(code.source.contains("size_t n_calls = 1000;"));
        assert!(code.source.contains("gsl_monte_plain_integrate(&G"));
        assert!(code
            .source
            .contains("double area_integral(double radius_min, double radius_max, double * error)\n{"));
        assert!(!code.source.contains("gsl_monte_vegas"));
    }

    #[test]
    fn test_algorithm_blocks() {
        let miser = render(GslAlgorithm::Miser);
        assert!(miser.source.contains("gsl_monte_miser_alloc(1)"));
        assert!(!miser.source.contains("gsl_monte_plain"));

        let vegas = render(GslAlgorithm::Vegas);
        assert!(vegas.source.contains("gsl_monte_vegas_chisq(s)"));
        assert!(vegas.source.contains("10000, r, s, &result, &_error"));
    }

    #[test]
    fn test_multi_dimensional_wrapper_and_bounds() {
        let integrand = FunctionDeclaration::new(
            "random_walk",
            "double",
            vec!["float".to_string(), "float".to_string(), "float".to_string()],
            vec!["x".to_string(), String::new(), "z".to_string()],
        )
        .unwrap();
        let integral = FunctionIntegral::derive(&integrand, None).unwrap();
        let templates = CodeTemplates::builtin().unwrap();
        let options = GenerationOptions::new("walk.h").unwrap();

        let code = GslMonteCarloIntegrator::new(integral, GslAlgorithm::Plain)
            .generate_code(&templates, &options)
            .unwrap();

        assert!(code.source.contains("return random_walk(x[0], x[1], x[2]);"));
        assert!(code.source.contains("{ x_min, var_2_min, z_min }"));
        assert!(code.source.contains("{ x_max, var_2_max, z_max }"));
        assert!(!code.source.contains("Dependency includes"));
    }
}
