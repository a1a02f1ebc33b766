//! Normalized schema graph.
//!
//! Raw document schemas are optional-field soup; this module turns
//! them into a tagged union so the compiler's dispatch is exhaustive
//! and checked at compile time. Precedence when a raw node carries
//! several keys: `$ref` > `anyOf` > `oneOf` > `allOf` > `not` >
//! primitive kind. Enum literals stay attached to the primitive and
//! win over the kind during compilation.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{EnumValue, Schema};

/// One unit of the recursive type-description graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Pointer to another named schema, resolved by registry lookup.
    Reference(String),
    /// Boolean composition operator.
    Composition(Composition),
    /// Everything else: a primitive kind plus its constraints.
    Primitive(Box<Primitive>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    AnyOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    AllOf(Vec<SchemaNode>),
    Not(Box<SchemaNode>),
}

/// Primitive kinds the compiler dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    #[default]
    Unknown,
}

/// An object property: name, node, and whether the parent requires it.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub node: SchemaNode,
    pub required: bool,
}

/// A non-composition schema node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Primitive {
    pub kind: SchemaKind,
    pub format: Option<String>,
    pub enum_values: Vec<EnumValue>,
    pub properties: Vec<Property>,
    pub items: Option<SchemaNode>,
    pub default: Option<serde_json::Value>,
    pub constraints: Constraints,
}

/// Validation keywords carried alongside a primitive kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

/// Strip the components prefix from a `$ref` path, falling back to the
/// last path segment for nonstandard refs.
pub fn ref_to_name(ref_path: &str) -> String {
    ref_path
        .strip_prefix("#/components/schemas/")
        .map(str::to_string)
        .unwrap_or_else(|| {
            ref_path
                .rsplit('/')
                .next()
                .unwrap_or(ref_path)
                .to_string()
        })
}

/// Normalize a raw document schema into a [`SchemaNode`].
pub fn normalize_schema(raw: &Schema) -> SchemaNode {
    if let Some(ref_path) = &raw.ref_path {
        return SchemaNode::Reference(ref_to_name(ref_path));
    }

    if let Some(any_of) = &raw.any_of {
        return SchemaNode::Composition(Composition::AnyOf(
            any_of.iter().map(normalize_schema).collect(),
        ));
    }
    if let Some(one_of) = &raw.one_of {
        return SchemaNode::Composition(Composition::OneOf(
            one_of.iter().map(normalize_schema).collect(),
        ));
    }
    if let Some(all_of) = &raw.all_of {
        return SchemaNode::Composition(Composition::AllOf(
            all_of.iter().map(normalize_schema).collect(),
        ));
    }
    if let Some(not) = &raw.not {
        return SchemaNode::Composition(Composition::Not(Box::new(normalize_schema(not))));
    }

    let kind = match raw.schema_type.as_deref() {
        Some("string") => SchemaKind::String,
        Some("number") => SchemaKind::Number,
        Some("integer") => SchemaKind::Integer,
        Some("boolean") => SchemaKind::Boolean,
        Some("object") => SchemaKind::Object,
        Some("array") => SchemaKind::Array,
        _ => SchemaKind::Unknown,
    };

    let required: BTreeSet<&str> = raw
        .required
        .as_ref()
        .map(|r| r.iter().map(String::as_str).collect())
        .unwrap_or_default();

    let properties = raw
        .properties
        .as_ref()
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| Property {
                    name: name.clone(),
                    node: normalize_schema(schema),
                    required: required.contains(name.as_str()),
                })
                .collect()
        })
        .unwrap_or_default();

    SchemaNode::Primitive(Box::new(Primitive {
        kind,
        format: raw.format.clone(),
        enum_values: raw.enum_values.clone().unwrap_or_default(),
        properties,
        items: raw.items.as_deref().map(normalize_schema),
        default: raw.default.clone(),
        constraints: Constraints {
            min_length: raw.min_length,
            max_length: raw.max_length,
            pattern: raw.pattern.clone(),
            minimum: raw.minimum,
            maximum: raw.maximum,
            exclusive_minimum: raw.exclusive_minimum,
            exclusive_maximum: raw.exclusive_maximum,
            multiple_of: raw.multiple_of,
            min_items: raw.min_items,
            max_items: raw.max_items,
            min_properties: raw.min_properties,
            max_properties: raw.max_properties,
        },
    }))
}

/// Normalize the whole component registry.
pub fn normalize_registry(raw: &BTreeMap<String, Schema>) -> BTreeMap<String, SchemaNode> {
    raw.iter()
        .map(|(name, schema)| (name.clone(), normalize_schema(schema)))
        .collect()
}

impl SchemaNode {
    /// Collect every reference target reachable at any nesting depth.
    pub fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            SchemaNode::Reference(name) => out.push(name.clone()),
            SchemaNode::Composition(comp) => match comp {
                Composition::AnyOf(members)
                | Composition::OneOf(members)
                | Composition::AllOf(members) => {
                    for member in members {
                        member.collect_references(out);
                    }
                }
                Composition::Not(inner) => inner.collect_references(out),
            },
            SchemaNode::Primitive(prim) => {
                for prop in &prim.properties {
                    prop.node.collect_references(out);
                }
                if let Some(items) = &prim.items {
                    items.collect_references(out);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn raw(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ref_to_name() {
        assert_eq!(ref_to_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(ref_to_name("#/definitions/Pet"), "Pet");
    }

    #[test]
    fn test_ref_wins_over_type() {
        let node = normalize_schema(&raw(
            r##"{ "$ref": "#/components/schemas/Pet", "type": "object" }"##,
        ));
        assert_eq!(node, SchemaNode::Reference("Pet".into()));
    }

    #[test]
    fn test_any_of_wins_over_type() {
        let node = normalize_schema(&raw(
            r#"{ "anyOf": [{ "type": "string" }], "type": "object" }"#,
        ));
        assert!(matches!(
            node,
            SchemaNode::Composition(Composition::AnyOf(_))
        ));
    }

    #[test]
    fn test_unknown_kind_for_unset_type() {
        let node = normalize_schema(&raw("{}"));
        let SchemaNode::Primitive(prim) = node else {
            panic!("expected primitive");
        };
        assert_eq!(prim.kind, SchemaKind::Unknown);
    }

    #[test]
    fn test_object_properties_carry_required_flags() {
        let node = normalize_schema(&raw(
            r#"{
              "type": "object",
              "required": ["id"],
              "properties": { "id": { "type": "string" }, "name": { "type": "string" } }
            }"#,
        ));
        let SchemaNode::Primitive(prim) = node else {
            panic!("expected primitive");
        };
        let id = prim.properties.iter().find(|p| p.name == "id").unwrap();
        let name = prim.properties.iter().find(|p| p.name == "name").unwrap();
        assert!(id.required);
        assert!(!name.required);
    }

    #[test]
    fn test_collect_references_nested() {
        let node = normalize_schema(&raw(
            r##"{
              "type": "object",
              "properties": {
                "pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } },
                "owner": { "anyOf": [{ "$ref": "#/components/schemas/Owner" }] }
              }
            }"##,
        ));
        let mut refs = Vec::new();
        node.collect_references(&mut refs);
        refs.sort();
        assert_eq!(refs, vec!["Owner".to_string(), "Pet".to_string()]);
    }
}
