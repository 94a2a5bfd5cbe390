use tracing::debug;

use crate::error::{FeynmanError, Result};
use super::{base_context, FunctionIntegrator, GeneratedCode, GenerationOptions};
use crate::core::identifier::to_pascal_case;
use crate::core::integral::FunctionIntegral;
use crate::core::templates::CodeTemplates;

/// Work items launched per integration
const WORK_ITEMS: u64 = 1024;

/// Integrator that samples the integrand on an OpenCL device.
///
/// The integrand's own source text is compiled into the device program, so the
/// integrand must come from a definition rather than a prototype.
pub struct OpenClMonteCarloIntegrator {
    integral: FunctionIntegral,
}

impl OpenClMonteCarloIntegrator {
    pub fn new(integral: FunctionIntegral) -> Self {
        Self { integral }
    }
}

impl FunctionIntegrator for OpenClMonteCarloIntegrator {
    fn integral(&self) -> &FunctionIntegral {
        &self.integral
    }

    fn generate_code(&self, templates: &CodeTemplates, options: &GenerationOptions) -> Result<GeneratedCode> {
        let integrand = self.integral.integrand();
        let integrand_text = match integrand.text() {
            Some(text) if integrand.has_body() => text,
            _ => {
                return Err(FeynmanError::Validation(format!(
                    "The OpenCL backend needs the definition of '{}', not just its prototype",
                    integrand.name()
                )))
            }
        };

        let mut context = base_context(&self.integral, options)?;
        context.insert("integrand_text", integrand_text);
        context.insert("bounds_type", &format!("{}Bounds", to_pascal_case(self.integral.name())));
        context.insert("kernel_name", &format!("{}_kernel", self.integral.name()));
        context.insert("work_items", &WORK_ITEMS);

        let program = templates.render("opencl_kernel.cl", &context)?;
        context.insert("program_lines", &c_string_lines(&program));

        debug!("Rendering OpenCL integrator for {}", self.integral.name());

        Ok(GeneratedCode {
            header: templates.render("integral.h", &context)?,
            source: templates.render("opencl_monte_carlo.c", &context)?,
        })
    }
}

/// Escape text into the bodies of consecutive C string literals, one per line
fn c_string_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let escaped = line.replace('\\', "\\\\").replace('"', "\\\"");
            format!("{}\\n", escaped)
        })
        .collect()
}
