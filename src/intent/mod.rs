//! Intent schemas, extraction and validation.

pub mod extract;
pub mod schema;
pub mod template;
pub mod validate;

pub use extract::Extractor;
pub use schema::{FieldKind, FieldSpec, IntentSchema};
pub use template::PromptTemplate;
pub use validate::{FieldProblem, ValidatedIntent, ValidationReport, validate};
