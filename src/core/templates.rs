use std::path::Path;

use tera::{Context, Tera};
use tracing::{debug, info};

use crate::error::Result;

/// Built-in templates, registered under their output-facing names
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("integral.h", include_str!("../../templates/integral.h.tera")),
    ("gsl_monte_carlo.c", include_str!("../../templates/gsl_monte_carlo.c.tera")),
    ("opencl_kernel.cl", include_str!("../../templates/opencl_kernel.cl.tera")),
    ("opencl_monte_carlo.c", include_str!("../../templates/opencl_monte_carlo.c.tera")),
];

/// The set of code templates used by the integrators
pub struct CodeTemplates {
    tera: Tera,
}

impl CodeTemplates {
    /// Templates compiled into the binary
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Built-in templates, replaced by `<name>.tera` files found in `template_dir`
    pub fn with_overrides(template_dir: &Path) -> Result<Self> {
        let mut templates = Self::builtin()?;

        for (name, _) in BUILTIN_TEMPLATES {
            let path = template_dir.join(format!("{}.tera", name));
            if !path.is_file() {
                debug!("No override for template {} in {}", name, template_dir.display());
                continue;
            }

            let content = std::fs::read_to_string(&path)?;
            templates.tera.add_raw_template(name, &content)?;
            info!("Using template override: {}", path.display());
        }

        Ok(templates)
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_builtin_templates_are_registered() {
        let templates = CodeTemplates::builtin().unwrap();
        let mut names = templates.template_names();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["gsl_monte_carlo.c", "integral.h", "opencl_kernel.cl", "opencl_monte_carlo.c"]
        );
    }

    #[test]
    fn test_override_replaces_builtin_by_name() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("integral.h.tera")
            .write_str("/* custom */ {{ include_guard }}")
            .unwrap();

        let templates = CodeTemplates::with_overrides(temp.path()).unwrap();
        let mut context = Context::new();
        context.insert("include_guard", "AREA_H");

        assert_eq!(templates.render("integral.h", &context).unwrap(), "/* custom */ AREA_H");
    }
}
