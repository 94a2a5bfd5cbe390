mod engine;

// Syntax model and the C front end that produces it
pub mod syntax;
pub mod types;
pub mod frontend;

// Declarations and their discovery
pub mod identifier;
pub mod declaration;
pub mod finder;
pub mod source_unit;

// Integral derivation and code generation
pub mod integral;
pub mod templates;
pub mod integrator;

pub use syntax::{NodeKind, SyntaxNode, TypeDescriptor, TypeKind};
pub use types::resolve_type_name;
pub use frontend::{CFrontEnd, FrontEnd};
pub use identifier::{to_pascal_case, validate_identifier};
pub use declaration::{DeclarationExtent, FunctionDeclaration};
pub use finder::DeclarationFinder;
pub use source_unit::CFile;
pub use integral::FunctionIntegral;
pub use templates::CodeTemplates;
pub use integrator::{
    FunctionIntegrator, GeneratedCode, GenerationOptions, GslAlgorithm,
    GslMonteCarloIntegrator, IntegratorBackend, OpenClMonteCarloIntegrator,
};

pub use engine::{DeclarationSummary, Engine, GenerateRequest, GeneratedFiles};
