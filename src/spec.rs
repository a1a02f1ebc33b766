//! OpenAPI document model.
//!
//! Raw serde structs mirror the subset of OpenAPI 3.x this compiler
//! consumes (schemas, operations, servers, reusable components). The
//! validated [`Specification`] wrapper enforces the document-level
//! invariants before anything downstream runs.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::Error;

/// Root OpenAPI document as deserialized, before validation.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub openapi: Option<String>,
    pub info: Option<Info>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    pub components: Option<Components>,
}

/// Document metadata; the client class name derives from the title.
#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    pub title: Option<String>,
    pub version: Option<String>,
}

/// A server entry: a URL template plus variable declarations.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub variables: BTreeMap<String, ServerVariable>,
}

/// A server URL template variable.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVariable {
    pub default: String,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
}

/// Reusable components section.
#[derive(Debug, Deserialize)]
pub struct Components {
    pub schemas: Option<BTreeMap<String, Schema>>,
    pub parameters: Option<HashMap<String, Parameter>>,
    pub responses: Option<HashMap<String, Response>>,
    #[serde(rename = "requestBodies")]
    pub request_bodies: Option<HashMap<String, RequestBody>>,
}

/// A path item with one slot per HTTP method.
#[derive(Debug, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations on this path.
    pub parameters: Option<Vec<MaybeRef<Parameter>>>,
}

impl PathItem {
    /// Iterate declared operations in method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
            (HttpMethod::Options, self.options.as_ref()),
            (HttpMethod::Head, self.head.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
            (HttpMethod::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(m, op)| op.map(|op| (m, op)))
    }
}

/// HTTP methods a path item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    pub fn lower(self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

/// An API operation (one method bound to one path).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub parameters: Option<Vec<MaybeRef<Parameter>>>,
    pub request_body: Option<MaybeRef<RequestBody>>,
    #[serde(default)]
    pub responses: HashMap<String, MaybeRef<Response>>,
}

/// Either an inline item or a `$ref` into components.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaybeRef<T> {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

/// A parameter in path, query, header, or cookie position.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Schema>,
}

/// A request body keyed by media type.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    pub content: Option<HashMap<String, MediaType>>,
}

/// A response definition keyed by media type.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    pub content: Option<HashMap<String, MediaType>>,
}

/// Media type content (e.g. application/json).
#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// Raw JSON-Schema node as it appears in the document.
///
/// All keys are optional; the normalizer in `ir::schema` turns this
/// into the tagged [`crate::ir::schema::SchemaNode`] union.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    pub properties: Option<BTreeMap<String, Schema>>,
    pub required: Option<Vec<String>>,
    pub items: Option<Box<Schema>>,

    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,
    pub not: Option<Box<Schema>>,

    pub format: Option<String>,
    pub default: Option<serde_json::Value>,

    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

/// Enum literal: string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Validated, immutable in-memory representation of the document.
///
/// Built once per compile run; reference edges are resolved by name
/// against the component registry, never as object pointers.
#[derive(Debug)]
pub struct Specification {
    pub title: String,
    pub version: String,
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
    pub schemas: BTreeMap<String, Schema>,
    pub parameters: HashMap<String, Parameter>,
    pub responses: HashMap<String, Response>,
    pub request_bodies: HashMap<String, RequestBody>,
}

impl Specification {
    /// Validate a parsed document into a [`Specification`].
    ///
    /// Enforces the structural invariants the rest of the pipeline
    /// relies on: an `openapi` version in the 3.x family and a
    /// populated `info` section.
    pub fn from_document(doc: Document) -> Result<Self, Error> {
        let version_field = doc
            .openapi
            .ok_or_else(|| Error::Ingestion("missing `openapi` version field".into()))?;
        if !version_field.starts_with("3.") {
            return Err(Error::Ingestion(format!(
                "unsupported document version `{version_field}` (expected 3.x)"
            )));
        }

        let info = doc
            .info
            .ok_or_else(|| Error::Ingestion("missing `info` section".into()))?;
        let title = info
            .title
            .ok_or_else(|| Error::Ingestion("missing `info.title`".into()))?;
        let version = info
            .version
            .ok_or_else(|| Error::Ingestion("missing `info.version`".into()))?;

        let (schemas, parameters, responses, request_bodies) = match doc.components {
            Some(c) => (
                c.schemas.unwrap_or_default(),
                c.parameters.unwrap_or_default(),
                c.responses.unwrap_or_default(),
                c.request_bodies.unwrap_or_default(),
            ),
            None => Default::default(),
        };

        Ok(Specification {
            title,
            version,
            servers: doc.servers,
            paths: doc.paths,
            schemas,
            parameters,
            responses,
            request_bodies,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rejects_missing_version() {
        let doc = parse(r#"{ "info": { "title": "T", "version": "1" }, "paths": {} }"#);
        assert!(Specification::from_document(doc).is_err());
    }

    #[test]
    fn test_rejects_wrong_major_version() {
        let doc = parse(
            r#"{ "openapi": "2.0", "info": { "title": "T", "version": "1" }, "paths": {} }"#,
        );
        let err = Specification::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("unsupported document version"));
    }

    #[test]
    fn test_accepts_minimal_3x_document() {
        let doc = parse(
            r#"{ "openapi": "3.1.0", "info": { "title": "Pets", "version": "2.0" }, "paths": {} }"#,
        );
        let spec = Specification::from_document(doc).unwrap();
        assert_eq!(spec.title, "Pets");
        assert_eq!(spec.version, "2.0");
        assert!(spec.schemas.is_empty());
    }

    #[test]
    fn test_parses_servers_and_variables() {
        let doc = parse(
            r#"{
              "openapi": "3.0.3",
              "info": { "title": "T", "version": "1" },
              "servers": [
                { "url": "https://{env}.example.com",
                  "variables": { "env": { "default": "prod", "enum": ["prod", "dev"] } } }
              ],
              "paths": {}
            }"#,
        );
        let spec = Specification::from_document(doc).unwrap();
        assert_eq!(spec.servers.len(), 1);
        let var = &spec.servers[0].variables["env"];
        assert_eq!(var.default, "prod");
        assert_eq!(var.enum_values.as_deref(), Some(&["prod".to_string(), "dev".to_string()][..]));
    }

    #[test]
    fn test_parameter_ref_parses_as_ref() {
        let item: MaybeRef<Parameter> =
            serde_json::from_str(r##"{ "$ref": "#/components/parameters/limit" }"##).unwrap();
        assert!(matches!(item, MaybeRef::Ref { .. }));
    }

    #[test]
    fn test_path_item_iterates_all_methods() {
        let doc = parse(
            r#"{
              "openapi": "3.1.0",
              "info": { "title": "T", "version": "1" },
              "paths": {
                "/x": {
                  "get": { "operationId": "foo", "responses": {} },
                  "head": { "operationId": "foo", "responses": {} }
                }
              }
            }"#,
        );
        let spec = Specification::from_document(doc).unwrap();
        let methods: Vec<_> = spec.paths["/x"].operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Head]);
    }
}
