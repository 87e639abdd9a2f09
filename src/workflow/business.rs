//! Business logic probes over extracted function names

use crate::constants::extraction::BUSINESS_LOGIC_CAP;
use crate::types::{BusinessLogicRecord, FileAnalysis, FileCategory};

const VALIDATION_PREFIXES: &[&str] = &["validate", "check", "verify", "ensure", "assert"];
const CALCULATION_WORDS: &[&str] = &["calculate", "compute", "sum", "total"];
const WORKFLOW_PREFIXES: &[&str] = &["process", "handle", "execute", "run", "perform"];

fn starts_with_word(name: &str, prefixes: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    prefixes.iter().any(|p| {
        lower.starts_with(p)
            && name[p.len()..]
                .chars()
                .next()
                .is_none_or(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
    })
}

fn contains_word(name: &str, words: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    words.iter().any(|w| lower.contains(w))
}

/// Function and method names of one file, classified by four independent probes
pub fn extract_business_logic(file: &FileAnalysis) -> BusinessLogicRecord {
    let mut record = BusinessLogicRecord {
        file: file.path.clone(),
        ..Default::default()
    };
    if matches!(file.category, FileCategory::Test | FileCategory::Style | FileCategory::Config) {
        return record;
    }

    let names = file
        .functions
        .iter()
        .filter(|f| !f.is_component)
        .map(|f| f.name.clone())
        .chain(file.classes.iter().flat_map(|c| {
            c.methods
                .iter()
                .filter(|m| m.name != "constructor" && m.name != "__init__")
                .map(move |m| format!("{}.{}", c.symbol.name, m.name))
        }));

    for qualified in names {
        let bare = qualified.rsplit('.').next().unwrap_or(&qualified);
        if starts_with_word(bare, VALIDATION_PREFIXES) {
            push_capped(&mut record.validations, &qualified);
        }
        if contains_word(bare, CALCULATION_WORDS) {
            push_capped(&mut record.calculations, &qualified);
        }
        if starts_with_word(bare, WORKFLOW_PREFIXES) {
            push_capped(&mut record.workflows, &qualified);
        }
        push_capped(&mut record.functions, &qualified);
    }
    record
}

fn push_capped(list: &mut Vec<String>, name: &str) {
    if list.len() < BUSINESS_LOGIC_CAP && !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::symbols::analyze_file;
    use crate::types::{FileNode, NodeCategory};

    fn analysis(path: &str, content: &str) -> FileAnalysis {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut node = FileNode::file(name, path, content.to_string());
        node.category = Some(NodeCategory::Source);
        analyze_file(&node)
    }

    #[test]
    fn test_probes_are_independent() {
        let file = analysis(
            "src/services/checkout.ts",
            "export function validateCart(cart) { return true; }\nexport function calculateTotal(items) { return 0; }\nexport async function processOrder(order) {}\nexport function checksum(data) { return 1; }\nclass Billing {\n  handlePayment(p) {}\n}\n",
        );
        let record = extract_business_logic(&file);
        assert_eq!(record.validations, vec!["validateCart"]);
        assert_eq!(record.calculations, vec!["calculateTotal", "checksum"]);
        assert_eq!(record.workflows, vec!["processOrder", "Billing.handlePayment"]);
        assert_eq!(record.functions.len(), 5);
    }

    #[test]
    fn test_lists_are_capped() {
        let content: String = (0..40)
            .map(|i| format!("export function validateField{i}(v) {{ return v; }}\n"))
            .collect();
        let record = extract_business_logic(&analysis("src/validators.ts", &content));
        assert_eq!(record.validations.len(), BUSINESS_LOGIC_CAP);
        assert_eq!(record.functions.len(), BUSINESS_LOGIC_CAP);
    }

    #[test]
    fn test_python_snake_case() {
        let record = extract_business_logic(&analysis(
            "app/billing.py",
            "def verify_signature(payload):\n    pass\n\ndef compute_tax(amount):\n    pass\n\ndef checkout():\n    pass\n",
        ));
        assert_eq!(record.validations, vec!["verify_signature"]);
        assert_eq!(record.calculations, vec!["compute_tax"]);
        assert!(record.workflows.is_empty());
        assert_eq!(record.functions.len(), 3);
    }
}
