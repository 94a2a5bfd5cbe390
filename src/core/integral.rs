//! Integral signatures derived from integrand declarations
//!
//! An integrand `double f(double x, double y)` becomes
//! `double f_integral(double x_min, double x_max, double y_min, double y_max, double * error)`:
//! each dimension turns into a lower/upper bound pair and a trailing pointer
//! receives the error estimate when the caller wants it.

use crate::error::{FeynmanError, Result};
use super::declaration::FunctionDeclaration;
use super::identifier::validate_identifier;

/// Name of the trailing error-estimate parameter
pub const ERROR_ARGUMENT_NAME: &str = "error";

/// Default value of the trailing error-estimate parameter
pub const NULL_POINTER_LITERAL: &str = "NULL";

/// The integral of an integrand over per-dimension bounds
#[derive(Debug, Clone)]
pub struct FunctionIntegral {
    integrand: FunctionDeclaration,
    declaration: FunctionDeclaration,
    argument_default_values: Vec<Option<String>>,
    n_dimensions: usize,
}

impl FunctionIntegral {
    /// Derive the integral of `integrand`.
    ///
    /// Without `integral_name` the integral is called `<integrand>_integral`.
    /// A supplied name must be a legal C identifier.
    pub fn derive(integrand: &FunctionDeclaration, integral_name: Option<&str>) -> Result<Self> {
        if integrand.name().is_empty() || integrand.argument_names().len() != integrand.arity() {
            return Err(FeynmanError::Type(
                "The integrand must be a well-formed function declaration".to_string(),
            ));
        }

        let name = match integral_name {
            Some(name) => {
                validate_identifier(name)?;
                name.to_string()
            }
            None => format!("{}_integral", integrand.name()),
        };

        let mut argument_types: Vec<String> = integrand
            .argument_types()
            .iter()
            .flat_map(|ty| [ty.clone(), ty.clone()])
            .collect();

        let mut argument_names: Vec<String> = integrand
            .argument_names()
            .iter()
            .enumerate()
            .flat_map(|(index, name)| {
                let base = if name.is_empty() {
                    format!("var_{}", index + 1)
                } else {
                    name.clone()
                };
                [format!("{}_min", base), format!("{}_max", base)]
            })
            .collect();

        debug_assert_eq!(argument_types.len() % 2, 0, "bounds must come in pairs");
        let n_dimensions = argument_types.len() / 2;

        let mut argument_default_values = vec![None; argument_types.len()];

        argument_types.push(format!("{} *", integrand.return_type()));
        argument_names.push(ERROR_ARGUMENT_NAME.to_string());
        argument_default_values.push(Some(NULL_POINTER_LITERAL.to_string()));

        let declaration = FunctionDeclaration::new(
            name,
            integrand.return_type(),
            argument_types,
            argument_names,
        )?;

        Ok(Self {
            integrand: integrand.clone(),
            declaration,
            argument_default_values,
            n_dimensions,
        })
    }

    pub fn integrand(&self) -> &FunctionDeclaration {
        &self.integrand
    }

    /// The integral as a plain declaration
    pub fn declaration(&self) -> &FunctionDeclaration {
        &self.declaration
    }

    pub fn name(&self) -> &str {
        self.declaration.name()
    }

    pub fn return_type(&self) -> &str {
        self.declaration.return_type()
    }

    pub fn argument_types(&self) -> &[String] {
        self.declaration.argument_types()
    }

    pub fn argument_names(&self) -> &[String] {
        self.declaration.argument_names()
    }

    /// Default value per argument; only the error pointer has one
    pub fn argument_default_values(&self) -> &[Option<String>] {
        &self.argument_default_values
    }

    /// Number of integration dimensions, equal to the integrand's arity
    pub fn n_dimensions(&self) -> usize {
        self.n_dimensions
    }

    /// Names of the lower bound arguments, in dimension order
    pub fn lower_bound_names(&self) -> Vec<&str> {
        self.bound_names(0)
    }

    /// Names of the upper bound arguments, in dimension order
    pub fn upper_bound_names(&self) -> Vec<&str> {
        self.bound_names(1)
    }

    fn bound_names(&self, offset: usize) -> Vec<&str> {
        self.argument_names()[..2 * self.n_dimensions]
            .iter()
            .skip(offset)
            .step_by(2)
            .map(String::as_str)
            .collect()
    }

    pub fn signature(&self) -> String {
        self.declaration.signature()
    }

    /// Signature carrying default values, for C++ consumers
    pub fn signature_with_defaults(&self) -> String {
        let parameters = self
            .argument_types()
            .iter()
            .zip(self.argument_names())
            .zip(&self.argument_default_values)
            .map(|((ty, name), default)| match default {
                Some(value) => format!("{} {} = {}", ty, name, value),
                None => format!("{} {}", ty, name),
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("{} {}({})", self.return_type(), self.name(), parameters)
    }

    pub fn include_dependencies(&self) -> &[String] {
        self.declaration.include_dependencies()
    }

    pub fn add_include_dependency(&mut self, dependency: &str) -> Result<()> {
        self.declaration.add_include_dependency(dependency)
    }
}
