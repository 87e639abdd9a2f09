//! Workflow Extractor
//!
//! Recovers the signals a reader needs to describe what a project does:
//! - Routes (`routes`): registration calls, file-system handlers, UI routes
//! - UI interactions (`ui`): components, forms, handlers, navigation
//! - Data operations (`data_ops`): ORM, document store, SQL, HTTP
//! - Auth flow (`auth`) and business logic (`business`) probes
//!
//! Every probe is total: a project with nothing recognizable yields an
//! empty `WorkflowAnalysisData`.

mod auth;
mod business;
mod data_ops;
mod routes;
mod ui;

use tracing::{debug, info};

use crate::analyzer::language::SyntaxFamily;
use crate::types::{FileAnalysis, FileCategory, ProjectAnalysis, WorkflowAnalysisData};

pub use auth::probe_auth;
pub use business::extract_business_logic;
pub use data_ops::{crud_verb, entity_from_url, extract_data_operations, is_data_access_shaped};
pub use routes::{extract_routes, file_system_url, is_route_shaped};
pub use ui::{extract_ui_interactions, is_frontend_shaped};

fn is_code(file: &FileAnalysis) -> bool {
    matches!(file.language.family(), SyntaxFamily::Script | SyntaxFamily::Python)
        && file.category != FileCategory::Test
        && !file.content.is_empty()
}

pub fn extract_workflows(project: &ProjectAnalysis) -> WorkflowAnalysisData {
    let mut data = WorkflowAnalysisData::default();

    for file in project.files.iter().filter(|f| is_code(f)) {
        if is_route_shaped(file) {
            data.routes.extend(extract_routes(file));
        }
        if is_frontend_shaped(file) {
            let record = extract_ui_interactions(file);
            if !record.is_empty() {
                data.ui_interactions.push(record);
            }
        }
        if is_data_access_shaped(file) {
            data.data_operations.extend(extract_data_operations(file));
        }
        probe_auth(file, &mut data.auth);

        let logic = extract_business_logic(file);
        if !logic.is_empty() {
            data.business_logic.push(logic);
        }
        debug!("Workflow probes done for {}", file.path);
    }

    info!(
        "Extracted {} routes, {} UI files, {} data operations, {} auth flows, {} business-logic files",
        data.routes.len(),
        data.ui_interactions.len(),
        data.data_operations.len(),
        data.auth.flows.len(),
        data.business_logic.len()
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_project;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};

    fn project(files: &[(&str, &str)]) -> ProjectAnalysis {
        let mut root = ingest_files(
            "shop",
            files
                .iter()
                .map(|(p, c)| RawFile::new(*p, c.as_bytes().to_vec()))
                .collect(),
        );
        apply_filters(&mut root, &FilterOptions::default());
        analyze_project(&root, "shop")
    }

    #[test]
    fn test_full_stack_project() {
        let analysis = project(&[
            (
                "package.json",
                r#"{"name":"shop","dependencies":{"express":"^4.18.0","react":"^18.2.0","mongoose":"^7.0.0"}}"#,
            ),
            (
                "server/routes/orders.js",
                "const router = express.Router();\nrouter.post('/orders', requireAuth, async (req, res) => {\n  const order = await Order.create(req.body);\n  res.json(order);\n});\nmodule.exports = router;\n",
            ),
            (
                "src/components/OrderForm.jsx",
                "export function OrderForm({ onPlaced }) {\n  const handleSubmit = (e) => { e.preventDefault(); onPlaced(); };\n  return <form onSubmit={handleSubmit}><input name=\"qty\" /></form>;\n}\n",
            ),
            ("src/components/OrderForm.test.jsx", "test('x', () => { app.get('/never', h); });"),
        ]);
        let data = extract_workflows(&analysis);

        assert_eq!(data.routes.len(), 1);
        assert_eq!(data.routes[0].path, "/orders");
        assert_eq!(data.routes[0].middleware, vec!["requireAuth"]);
        assert_eq!(data.data_operations.len(), 1);
        assert_eq!(data.data_operations[0].entity.as_deref(), Some("Order"));
        assert_eq!(data.ui_interactions.len(), 1);
        assert_eq!(data.form_count(), 1);
        assert!(data.auth.flows.contains("Route protection"));
        assert!(data.business_logic.iter().any(|b| b.workflows.contains(&"handleSubmit".to_string())));
    }

    #[test]
    fn test_nothing_recognizable_is_empty() {
        let analysis = project(&[("README.md", "# Shop"), ("styles/main.css", "body { margin: 0; }")]);
        let data = extract_workflows(&analysis);
        assert!(data.is_empty());
        assert_eq!(data.form_count(), 0);
    }
}
