//! Data access extraction: ORM chains, document stores, SQL, outbound HTTP

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::scan::{LineIndex, find_matching_paren};
use crate::types::{AccessKind, CrudVerb, DataOperation, FileAnalysis, squash_whitespace, truncate_chars};

const PARAMETER_CHARS: usize = 80;

/// Globals whose static calls look like model calls
const NOT_MODELS: &[&str] = &[
    "Object", "Array", "Promise", "JSON", "Math", "Date", "Reflect", "Symbol", "Map", "Set", "Number",
    "String", "Intl", "React",
];

static PRISMA_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(prisma|db|tx)\.([a-z]\w*)\.(findMany|findUnique|findUniqueOrThrow|findFirst|create|createMany|update|updateMany|upsert|delete|deleteMany|count|aggregate|groupBy)\(")
        .expect("valid regex")
});

static MODEL_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]\w*)\.(find|findOne|findById|findAll|findByPk|findOneAndUpdate|findByIdAndUpdate|findOneAndDelete|findByIdAndDelete|create|bulkCreate|insertMany|updateOne|updateMany|deleteOne|deleteMany|destroy|countDocuments|aggregate)\(")
        .expect("valid regex")
});

static DJANGO_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]\w*)\.objects\.(all|filter|get|create|update|delete|exclude|get_or_create|update_or_create|bulk_create)\(")
        .expect("valid regex")
});

static SESSION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:db\.)?session\.(query|add|delete|merge|get)\(\s*([A-Z]\w*)?").expect("valid regex")
});

static SUPABASE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bsupabase\s*\.from\(\s*['"`](\w+)['"`]\s*\)\s*\.(select|insert|update|upsert|delete)\("#)
        .expect("valid regex")
});

static COLLECTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.collection\(\s*['"`](\w+)['"`]\s*\)\s*\.(\w+)\("#).expect("valid regex")
});

static FIRESTORE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(addDoc|setDoc|getDocs|getDoc|updateDoc|deleteDoc|onSnapshot)\(\s*(?:collection|doc|query)\(\s*(?:\w+\s*,\s*)?['"`](\w+)['"`]"#)
        .expect("valid regex")
});

static SQL_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)['"`]\s*(SELECT|INSERT|UPDATE|DELETE)\b([^'"`]*)"#).expect("valid regex")
});

static SQL_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:FROM|INTO|UPDATE)\s+[`"\[]?(\w+)"#).expect("valid regex")
});

static FETCH_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bfetch\(\s*['"`]([^'"`]+)['"`]"#).expect("valid regex")
});

static FETCH_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bmethod\s*:\s*['"`](\w+)['"`]"#).expect("valid regex")
});

static CLIENT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(axios|api|http|client|apiClient|\$http|ky)\.(get|post|put|patch|delete)\(\s*['"`]([^'"`]+)['"`]"#)
        .expect("valid regex")
});

const CONTENT_PROBES: &[&str] = &[
    "prisma", "mongoose", "sequelize", "supabase", "firestore", "firebase", ".collection(", "fetch(",
    "axios", ".objects.", "session.", "SELECT ", "INSERT ", "UPDATE ", "DELETE ", "api.", "http.", "client.",
];

pub fn is_data_access_shaped(file: &FileAnalysis) -> bool {
    CONTENT_PROBES.iter().any(|p| file.content.contains(p))
}

pub fn extract_data_operations(file: &FileAnalysis) -> Vec<DataOperation> {
    let text = file.content.as_str();
    let lines = LineIndex::new(text);
    let op = |offset: usize, access: AccessKind, store: &str, operation: &str, entity: Option<String>| DataOperation {
        file: file.path.clone(),
        line: lines.line_of(offset),
        access,
        store: store.to_string(),
        operation: operation.to_string(),
        verb: crud_verb(operation),
        entity,
        parameters: None,
    };
    let mut out = Vec::new();

    // ORM chains
    for caps in PRISMA_CALL.captures_iter(text) {
        let (Some(whole), Some(model), Some(method)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        let mut record = op(whole.start(), AccessKind::Orm, "prisma", method.as_str(), Some(model.as_str().to_string()));
        record.parameters = call_arguments(text, whole.end() - 1);
        out.push(record);
    }
    let model_store = if text.contains("sequelize") || text.contains("Sequelize") {
        "sequelize"
    } else {
        "mongoose"
    };
    for caps in MODEL_CALL.captures_iter(text) {
        let (Some(whole), Some(model), Some(method)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if NOT_MODELS.contains(&model.as_str()) {
            continue;
        }
        let mut record = op(whole.start(), AccessKind::Orm, model_store, method.as_str(), Some(model.as_str().to_string()));
        record.parameters = call_arguments(text, whole.end() - 1);
        out.push(record);
    }
    for caps in DJANGO_CALL.captures_iter(text) {
        let (Some(whole), Some(model), Some(method)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push(op(whole.start(), AccessKind::Orm, "django", method.as_str(), Some(model.as_str().to_string())));
    }
    for caps in SESSION_CALL.captures_iter(text) {
        let (Some(whole), Some(method)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let entity = caps.get(2).map(|m| m.as_str().to_string());
        out.push(op(whole.start(), AccessKind::Orm, "sqlalchemy", method.as_str(), entity));
    }

    // Document stores
    for caps in SUPABASE_CALL.captures_iter(text) {
        let (Some(whole), Some(table), Some(method)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push(op(whole.start(), AccessKind::DocumentStore, "supabase", method.as_str(), Some(table.as_str().to_string())));
    }
    let collection_store = if text.contains("firebase") || text.contains("firestore") {
        "firestore"
    } else {
        "mongodb"
    };
    for caps in COLLECTION_CALL.captures_iter(text) {
        let (Some(whole), Some(collection), Some(method)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push(op(
            whole.start(),
            AccessKind::DocumentStore,
            collection_store,
            method.as_str(),
            Some(collection.as_str().to_string()),
        ));
    }
    for caps in FIRESTORE_CALL.captures_iter(text) {
        let (Some(whole), Some(method), Some(collection)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push(op(
            whole.start(),
            AccessKind::DocumentStore,
            "firestore",
            method.as_str(),
            Some(collection.as_str().to_string()),
        ));
    }

    // SQL
    for caps in SQL_STATEMENT.captures_iter(text) {
        let (Some(whole), Some(keyword), Some(rest)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let statement = format!("{}{}", keyword.as_str(), rest.as_str());
        let table = SQL_TABLE
            .captures(&statement)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let keyword = keyword.as_str().to_ascii_uppercase();
        let mut record = op(whole.start(), AccessKind::Sql, "sql", &keyword, table);
        record.parameters = Some(truncate_chars(&squash_whitespace(&statement), PARAMETER_CHARS));
        out.push(record);
    }

    // Outbound HTTP
    for caps in FETCH_CALL.captures_iter(text) {
        let (Some(whole), Some(url)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let method = call_arguments(text, whole.start() + "fetch".len())
            .and_then(|args| FETCH_METHOD.captures(&args).and_then(|c| c.get(1)).map(|m| m.as_str().to_ascii_uppercase()))
            .unwrap_or_else(|| "GET".to_string());
        let mut record = op(whole.start(), AccessKind::Http, "fetch", &method, entity_from_url(url.as_str()));
        record.parameters = Some(url.as_str().to_string());
        out.push(record);
    }
    for caps in CLIENT_CALL.captures_iter(text) {
        let (Some(whole), Some(client), Some(method), Some(url)) = (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let method = method.as_str().to_ascii_uppercase();
        let mut record = op(whole.start(), AccessKind::Http, client.as_str(), &method, entity_from_url(url.as_str()));
        record.parameters = Some(url.as_str().to_string());
        out.push(record);
    }

    out.sort_by_key(|o| o.line);
    out
}

/// Map an operation name to its CRUD verb by prefix
pub fn crud_verb(operation: &str) -> CrudVerb {
    const READ: &[&str] = &[
        "find", "get", "select", "query", "count", "aggregate", "group", "fetch", "read", "list", "all", "filter",
        "exclude", "onsnapshot",
    ];
    const CREATE: &[&str] = &["create", "insert", "add", "post", "save", "bulk_create", "bulkcreate"];
    const UPDATE: &[&str] = &["update", "put", "patch", "upsert", "set", "merge"];
    const DELETE: &[&str] = &["delete", "destroy", "remove"];

    let op = operation.to_ascii_lowercase();
    // `findOneAndUpdate` and friends mutate despite the read prefix
    if op.contains("andupdate") {
        return CrudVerb::Update;
    }
    if op.contains("anddelete") {
        return CrudVerb::Delete;
    }
    if op == "get_or_create" || op == "update_or_create" {
        return CrudVerb::Update;
    }
    for (prefixes, verb) in [
        (READ, CrudVerb::Read),
        (CREATE, CrudVerb::Create),
        (UPDATE, CrudVerb::Update),
        (DELETE, CrudVerb::Delete),
    ] {
        if prefixes.iter().any(|p| op.starts_with(p)) {
            return verb;
        }
    }
    CrudVerb::Unknown
}

/// Last literal path segment of a URL: `/api/users/${id}` → `users`
pub fn entity_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.split('/')
        .filter(|s| !s.is_empty())
        .filter(|s| !s.contains("${") && !s.starts_with(':') && !s.starts_with('{') && !s.starts_with('['))
        .filter(|s| !s.contains('.') && !s.chars().all(|c| c.is_ascii_digit()))
        .filter(|s| !matches!(*s, "api" | "v1" | "v2" | "v3" | "http:" | "https:"))
        .next_back()
        .map(str::to_string)
}

fn call_arguments(text: &str, open: usize) -> Option<String> {
    let close = find_matching_paren(text, open)?;
    let args = squash_whitespace(&text[open + 1..close]);
    (!args.is_empty()).then(|| truncate_chars(&args, PARAMETER_CHARS))
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

    fn summary(ops: &[DataOperation]) -> Vec<(AccessKind, &str, CrudVerb, Option<&str>)> {
        ops.iter()
            .map(|o| (o.access, o.store.as_str(), o.verb, o.entity.as_deref()))
            .collect()
    }

    #[test]
    fn test_orm_calls() {
        let file = analysis(
            "src/services/orders.ts",
            "export async function list() {\n  return prisma.order.findMany({ where: { paid: true } });\n}\nexport async function remove(id) {\n  await Order.findByIdAndDelete(id);\n  const copy = Object.create(null);\n}\n",
        );
        assert!(is_data_access_shaped(&file));
        let ops = extract_data_operations(&file);
        assert_eq!(
            summary(&ops),
            vec![
                (AccessKind::Orm, "prisma", CrudVerb::Read, Some("order")),
                (AccessKind::Orm, "mongoose", CrudVerb::Delete, Some("Order")),
            ]
        );
        assert_eq!(ops[0].parameters.as_deref(), Some("{ where: { paid: true } }"));
    }

    #[test]
    fn test_document_stores() {
        let file = analysis(
            "src/lib/data.js",
            "const { data } = await supabase\n  .from('profiles')\n  .update({ name })\n  .eq('id', id);\nawait db.collection('orders').insertOne(order);\n",
        );
        let ops = extract_data_operations(&file);
        assert_eq!(
            summary(&ops),
            vec![
                (AccessKind::DocumentStore, "supabase", CrudVerb::Update, Some("profiles")),
                (AccessKind::DocumentStore, "mongodb", CrudVerb::Create, Some("orders")),
            ]
        );
    }

    #[test]
    fn test_sql_and_http() {
        let file = analysis(
            "app/repo.py",
            "rows = cursor.execute(\"SELECT id, total FROM invoices WHERE paid = 0\")\n",
        );
        let ops = extract_data_operations(&file);
        assert_eq!(summary(&ops), vec![(AccessKind::Sql, "sql", CrudVerb::Read, Some("invoices"))]);

        let client = analysis(
            "src/api/cart.ts",
            "export const add = (item) => fetch('/api/cart/items', { method: 'POST', body: JSON.stringify(item) });\nexport const load = (id) => axios.get(`/api/carts/${id}`);\n",
        );
        let ops = extract_data_operations(&client);
        assert_eq!(
            summary(&ops),
            vec![
                (AccessKind::Http, "fetch", CrudVerb::Create, Some("items")),
                (AccessKind::Http, "axios", CrudVerb::Read, Some("carts")),
            ]
        );
        assert_eq!(ops[0].operation, "POST");
    }

    #[test]
    fn test_crud_verbs() {
        assert_eq!(crud_verb("findMany"), CrudVerb::Read);
        assert_eq!(crud_verb("findOneAndUpdate"), CrudVerb::Update);
        assert_eq!(crud_verb("insertOne"), CrudVerb::Create);
        assert_eq!(crud_verb("destroy"), CrudVerb::Delete);
        assert_eq!(crud_verb("eq"), CrudVerb::Unknown);
    }

    #[test]
    fn test_entity_from_url() {
        assert_eq!(entity_from_url("/api/users/${id}").as_deref(), Some("users"));
        assert_eq!(entity_from_url("https://example.com/v1/orders?page=2").as_deref(), Some("orders"));
        assert_eq!(entity_from_url("/api"), None);
    }
}
