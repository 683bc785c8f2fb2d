//! Strict-mode JSON schemas for structured model output.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Types the model can be asked to return.
///
/// Blanket-implemented for any `JsonSchema + DeserializeOwned` type.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Schema accepted by strict structured output.
    ///
    /// Strict mode requires `additionalProperties: false` on every object,
    /// every property listed in `required`, no `$ref`, and no `format` or
    /// `default` keywords.
    fn openai_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        fix_object_schemas(&mut value);
        inline_refs(&mut value);
        strip_keywords(&mut value, &["format", "default"]);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn fix_object_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                if let Some(Value::Object(props)) = map.get("properties") {
                    let all_keys = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(all_keys));
                }
            }

            for (_, v) in map.iter_mut() {
                fix_object_schemas(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(fix_object_schemas),
        _ => {}
    }
}

fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(def) = target {
                *value = def;
                inline_refs_recursive(value, definitions);
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

fn strip_keywords(value: &mut Value, keywords: &[&str]) {
    match value {
        Value::Object(map) => {
            for keyword in keywords {
                map.remove(*keyword);
            }
            for (key, v) in map.iter_mut() {
                match (key.as_str(), v) {
                    // property names are not keywords
                    ("properties", Value::Object(props)) => props
                        .values_mut()
                        .for_each(|p| strip_keywords(p, keywords)),
                    (_, v) => strip_keywords(v, keywords),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| strip_keywords(v, keywords)),
        _ => {}
    }
}
