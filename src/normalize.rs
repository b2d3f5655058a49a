// Canonicalizes the loosely shaped curriculum payloads the backend returns.
// Call sites disagree on field names (Portuguese vs English), so every field
// is read through an alias list: first present and non-empty value wins.

use serde_json::{Map, Value};

use crate::models::{Activity, Curriculum, Module, OpaqueId};

const MODULES: &[&str] = &["modulos", "modules"];
const TITLE: &[&str] = &["titulo", "title"];
const ACTIVITIES: &[&str] = &["atividades", "activities"];
const COMPLETED: &[&str] = &["concluida", "completed"];
const NEEDS_RESUME: &[&str] = &["precisaRetomar", "needsResume"];
const ID: &[&str] = &["id", "_id"];

pub fn normalize(raw: &Value) -> Curriculum {
    let modules: &[Value] = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match pick(obj, MODULES) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => {
                tracing::debug!("curriculum object without a module list");
                &[]
            }
        },
        Value::Null => &[],
        other => {
            tracing::debug!(kind = kind(other), "curriculum payload is not a list");
            &[]
        }
    };

    Curriculum {
        modules: modules
            .iter()
            .enumerate()
            .map(|(index, m)| normalize_module(index, m))
            .collect(),
    }
}

fn normalize_module(index: usize, raw: &Value) -> Module {
    let Some(obj) = raw.as_object() else {
        tracing::debug!(index, kind = kind(raw), "module entry is not an object");
        return Module {
            id: None,
            index,
            title: format!("Module {}", index + 1),
            activities: Vec::new(),
        };
    };

    let activities = match pick(obj, ACTIVITIES) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, a)| normalize_activity(i, a))
            .collect(),
        Some(other) => {
            tracing::debug!(index, kind = kind(other), "module activities are not a list");
            Vec::new()
        }
        None => Vec::new(),
    };

    Module {
        id: pick(obj, ID).and_then(OpaqueId::from_json),
        index,
        title: text(obj, TITLE).unwrap_or_else(|| format!("Module {}", index + 1)),
        activities,
    }
}

fn normalize_activity(index: usize, raw: &Value) -> Activity {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    Activity {
        id: pick(obj, ID).and_then(OpaqueId::from_json),
        title: text(obj, TITLE).unwrap_or_else(|| format!("Activity {}", index + 1)),
        completed: pick(obj, COMPLETED).map(truthy).unwrap_or(false),
        needs_resume: pick(obj, NEEDS_RESUME).map(truthy).unwrap_or(false),
    }
}

// ------------- helpers -------------

/// First alias whose value is present and not empty (null, "", [] and {}
/// count as empty).
fn pick<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !is_empty(v))
}

fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn text(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    match pick(obj, aliases)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Backend flags show up as booleans, 0/1 or strings depending on the endpoint.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "sim" | "yes"
        ),
        _ => false,
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
