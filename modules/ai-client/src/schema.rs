use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Types usable as a strict structured-output target.
///
/// Automatically implemented for any `JsonSchema + DeserializeOwned` type.
/// The generated schema satisfies the constraints shared by OpenAI-style
/// `response_format` and browser-agent output schemas:
/// 1. `additionalProperties: false` on every object
/// 2. every property listed in `required`, nullable ones included
/// 3. no `$ref` indirection: definitions are inlined
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn strict_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        close_object_schemas(&mut value);
        inline_refs(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
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

/// Walk the schema, closing every object and marking all properties required.
fn close_object_schemas(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.get("type") == Some(&serde_json::Value::String("object".into())) {
                map.insert("additionalProperties".into(), serde_json::Value::Bool(false));
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let keys: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".into(), serde_json::Value::Array(keys));
                }
            }
            for (_, v) in map.iter_mut() {
                close_object_schemas(v);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                close_object_schemas(item);
            }
        }
        _ => {}
    }
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = match value {
        serde_json::Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };
    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            // schemars wraps single-variant refs in allOf; unwrap before descending
            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Post {
        title: String,
        url: String,
        summary: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct PostSheet {
        posts: Vec<Post>,
    }

    #[test]
    fn objects_are_closed() {
        let schema = PostSheet::strict_schema();
        let rendered = serde_json::to_string(&schema).unwrap();
        assert!(rendered.contains("additionalProperties"));
    }

    #[test]
    fn nullable_properties_are_still_required() {
        let schema = Post::strict_schema();
        let required = schema
            .as_object()
            .unwrap()
            .get("required")
            .expect("required array")
            .as_array()
            .unwrap();
        let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert!(names.contains(&"title"));
        assert!(names.contains(&"url"));
        assert!(names.contains(&"summary"));
    }

    #[test]
    fn nested_definitions_are_inlined() {
        let schema = PostSheet::strict_schema();
        let obj = schema.as_object().unwrap();
        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));

        let items = &obj["properties"]["posts"]["items"];
        assert!(items.get("$ref").is_none());
        assert_eq!(items["type"], "object");
    }
}
