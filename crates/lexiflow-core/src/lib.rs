pub mod analysis;
pub mod document;
pub mod schema;

pub use analysis::{ChecklistItem, DocumentAnalysis, RiskFinding, RiskLevel};
pub use document::{SourceFile, is_accepted_mime, mime_for_path, sniff_mime};
pub use schema::{SchemaError, response_schema, validate};
