//! Schema pillar: extract Schema.org JSON-LD from `<script type="application/ld+json">`.

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::core::types::{SchemaOrgResult, SchemaReport};

fn schema_result_from(map: &Map<String, Value>) -> SchemaOrgResult {
    let schema_type = match map.get("@type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => {
            let labels: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if labels.is_empty() {
                "Unknown".to_string()
            } else {
                labels.join(", ")
            }
        }
        _ => "Unknown".to_string(),
    };
    let properties = map
        .keys()
        .filter(|k| !k.starts_with('@'))
        .cloned()
        .collect();
    SchemaOrgResult {
        schema_type,
        properties,
    }
}

/// Collect candidate objects from a decoded JSON-LD value.
///
/// Arrays are iterated. For objects carrying `@graph`, each graph member is a
/// candidate and the wrapper itself only counts when it has its own `@type`
/// (a bare `{"@context", "@graph"}` envelope is packaging, not an entity).
fn collect_candidates(value: &Value, out: &mut Vec<SchemaOrgResult>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_candidates(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                if map.contains_key("@type") {
                    out.push(schema_result_from(map));
                }
                collect_candidates(graph, out);
            } else {
                out.push(schema_result_from(map));
            }
        }
        _ => {}
    }
}

/// Parse every ld+json script in `html` and report the candidate objects.
/// Malformed JSON and empty script bodies are silently skipped.
pub fn check_schema_org(html: &str) -> SchemaReport {
    if html.trim().is_empty() {
        return SchemaReport {
            detail: "No HTML to analyze".to_string(),
            ..Default::default()
        };
    }

    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return SchemaReport::default();
    };
    let document = Html::parse_document(html);

    let mut schemas: Vec<SchemaOrgResult> = Vec::new();
    for script in document.select(&selector) {
        let json_text = script.inner_html();
        if json_text.trim().is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&json_text) {
            collect_candidates(&value, &mut schemas);
        }
    }

    let blocks_found = schemas.len();
    let detail = if blocks_found == 0 {
        "No JSON-LD blocks found".to_string()
    } else {
        let types: Vec<&str> = schemas
            .iter()
            .take(3)
            .map(|s| s.schema_type.as_str())
            .collect();
        format!("{blocks_found} JSON-LD block(s): {}", types.join(", "))
    };

    SchemaReport {
        blocks_found,
        schemas,
        score: 0.0,
        detail,
    }
}
