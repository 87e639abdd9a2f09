//! Document Synthesizer
//!
//! Renders a `ProjectAnalysis` into documents. Every renderer is a pure
//! function of the analysis (and options); nothing here mutates it.
//!
//! - `standard`: fixed seven-section document
//! - `professional`: section registry selected by document type and standard
//! - `ai_optimized`: dense variant for model contexts
//! - `workflow_doc`: markdown for workflow signals and generated stories
//! - `export`: byte payloads per format

mod ai_optimized;
mod export;
mod metadata;
mod professional;
mod standard;
mod workflow_doc;

pub use ai_optimized::generate_ai_optimized;
pub use export::{ExportFormat, ExportPayload, Exportable, export, markdown_to_text};
pub use professional::{ProfessionalConfig, SectionId, generate_professional, sections_for};
pub use standard::generate_standard;
pub use workflow_doc::{api_routes, render_workflow_analysis, render_workflow_result};
