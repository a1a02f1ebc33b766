//! Normalization from the validated document to API IR.
//!
//! All document-shape quirks are absorbed here: `$ref` indirection for
//! parameters, bodies, and responses; path-level parameter merging;
//! media-type selection; and operation naming. Downstream stages only
//! ever see the resolved IR.

use tracing::{debug, warn};

use crate::spec::{
    HttpMethod, MaybeRef, MediaType, Operation, Parameter, RequestBody, Response, Specification,
};

use super::api::{
    ApiIR, BodyEncoding, BodyIR, OperationIR, ParamIR, ParamLocation, ResponseIR, ServerIR,
    ServerVariableIR,
};
use super::naming::{self, NamingConfig, OperationMeta};
use super::schema::{normalize_registry, normalize_schema};

/// Response statuses consulted for the validation schema, in order.
const RESPONSE_PICK_ORDER: [&str; 3] = ["200", "201", "default"];

/// Normalize a validated document into [`ApiIR`].
pub fn normalize_spec(spec: &Specification, naming: Option<&NamingConfig>) -> ApiIR {
    let registry = normalize_registry(&spec.schemas);
    let servers = normalize_servers(spec);

    // First pass collects every operation that carries an id; naming
    // needs the full list up front to spot duplicate ids.
    let mut collected: Vec<(&str, HttpMethod, &Operation)> = Vec::new();
    for (path, item) in &spec.paths {
        for (method, op) in item.operations() {
            match op.operation_id.as_deref() {
                Some(_) => collected.push((path.as_str(), method, op)),
                None => {
                    warn!(path, method = method.as_str(), "operation without operationId, skipped");
                }
            }
        }
    }

    let metas: Vec<OperationMeta<'_>> = collected
        .iter()
        .map(|(path, method, op)| OperationMeta {
            operation_id: op.operation_id.as_deref().unwrap_or_default(),
            method: *method,
            path: *path,
        })
        .collect();
    let names = naming::resolve_operation_names(&metas, naming);

    let operations = collected
        .iter()
        .zip(names)
        .map(|((path, method, op), name)| {
            let shared = spec
                .paths
                .get(*path)
                .and_then(|item| item.parameters.as_deref())
                .unwrap_or_default();
            normalize_operation(spec, name, *method, path, op, shared)
        })
        .collect();

    ApiIR {
        title: spec.title.clone(),
        version: spec.version.clone(),
        servers,
        operations,
        registry,
    }
}

fn normalize_servers(spec: &Specification) -> Vec<ServerIR> {
    spec.servers
        .iter()
        .map(|server| ServerIR {
            url: server.url.clone(),
            variables: server
                .variables
                .iter()
                .map(|(name, var)| ServerVariableIR {
                    name: name.clone(),
                    default: var.default.clone(),
                    enum_values: var.enum_values.clone().unwrap_or_default(),
                })
                .collect(),
        })
        .collect()
}

fn normalize_operation(
    spec: &Specification,
    name: String,
    method: HttpMethod,
    path: &str,
    op: &Operation,
    shared_params: &[MaybeRef<Parameter>],
) -> OperationIR {
    let params = merge_parameters(spec, shared_params, op.parameters.as_deref().unwrap_or_default());
    let body = op
        .request_body
        .as_ref()
        .and_then(|body| normalize_body(spec, body));
    let response = pick_response(spec, op);

    OperationIR {
        name,
        method,
        path: path.to_string(),
        summary: op.summary.clone(),
        params,
        body,
        response,
    }
}

/// Path-level parameters apply to every operation on the path; an
/// operation-level parameter with the same (name, location) overrides.
fn merge_parameters(
    spec: &Specification,
    shared: &[MaybeRef<Parameter>],
    own: &[MaybeRef<Parameter>],
) -> Vec<ParamIR> {
    let mut resolved: Vec<Parameter> = Vec::new();
    for param in shared.iter().chain(own) {
        let Some(param) = resolve_parameter(spec, param) else {
            continue;
        };
        if let Some(existing) = resolved
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            *existing = param;
        } else {
            resolved.push(param);
        }
    }

    resolved
        .into_iter()
        .filter_map(|param| {
            let location = match param.location.as_str() {
                "path" => ParamLocation::Path,
                "query" => ParamLocation::Query,
                "header" => ParamLocation::Header,
                "cookie" => ParamLocation::Cookie,
                other => {
                    warn!(name = param.name, location = other, "unknown parameter location, skipped");
                    return None;
                }
            };
            let node = param
                .schema
                .as_ref()
                .map(normalize_schema)
                .unwrap_or_else(|| normalize_schema(&Default::default()));
            Some(ParamIR {
                name: naming::sanitize(&param.name),
                original_name: param.name,
                location,
                // Path parameters are mandatory regardless of the flag.
                required: param.required || location == ParamLocation::Path,
                node,
            })
        })
        .collect()
}

fn resolve_parameter(spec: &Specification, param: &MaybeRef<Parameter>) -> Option<Parameter> {
    match param {
        MaybeRef::Item(param) => Some(param.clone()),
        MaybeRef::Ref { reference } => {
            let name = component_name(reference);
            let resolved = spec.parameters.get(name).cloned();
            if resolved.is_none() {
                warn!(reference, "dangling parameter reference, skipped");
            }
            resolved
        }
    }
}

fn normalize_body(spec: &Specification, body: &MaybeRef<RequestBody>) -> Option<BodyIR> {
    let body = match body {
        MaybeRef::Item(body) => body.clone(),
        MaybeRef::Ref { reference } => {
            let name = component_name(reference);
            match spec.request_bodies.get(name) {
                Some(body) => body.clone(),
                None => {
                    warn!(reference, "dangling request body reference, skipped");
                    return None;
                }
            }
        }
    };

    let content = body.content?;
    let (encoding, media) = if let Some(media) = content.get("application/json") {
        (BodyEncoding::Json, media)
    } else if let Some(media) = content.get("application/x-www-form-urlencoded") {
        (BodyEncoding::FormUrlEncoded, media)
    } else {
        // Unrecognized media types are treated as JSON-shaped.
        let (mime, media) = content.iter().next()?;
        debug!(mime, "unrecognized request media type, treating as JSON");
        (BodyEncoding::Json, media)
    };

    let schema = media.schema.as_ref()?;
    Some(BodyIR {
        encoding,
        required: body.required,
        node: normalize_schema(schema),
    })
}

fn pick_response(spec: &Specification, op: &Operation) -> ResponseIR {
    for status in RESPONSE_PICK_ORDER {
        let Some(response) = op.responses.get(status) else {
            continue;
        };
        let response = match response {
            MaybeRef::Item(response) => response.clone(),
            MaybeRef::Ref { reference } => {
                let name = component_name(reference);
                match spec.responses.get(name) {
                    Some(response) => response.clone(),
                    None => {
                        warn!(reference, "dangling response reference, skipped");
                        continue;
                    }
                }
            }
        };
        if let Some(node) = response_schema(&response) {
            return ResponseIR { node: Some(node) };
        }
    }
    ResponseIR::default()
}

fn response_schema(response: &Response) -> Option<super::schema::SchemaNode> {
    let content = response.content.as_ref()?;
    let media: &MediaType = content
        .get("application/json")
        .or_else(|| content.values().next())?;
    media.schema.as_ref().map(normalize_schema)
}

/// Last path segment of a components `$ref`.
fn component_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::spec::{Document, Specification};

    fn spec(json: &str) -> Specification {
        let doc: Document = serde_json::from_str(json).unwrap();
        Specification::from_document(doc).unwrap()
    }

    fn minimal_with_paths(paths: &str) -> Specification {
        spec(&format!(
            r#"{{
              "openapi": "3.1.0",
              "info": {{ "title": "T", "version": "1" }},
              "paths": {paths}
            }}"#
        ))
    }

    #[test]
    fn test_operations_without_id_are_skipped() {
        let spec = minimal_with_paths(
            r#"{
              "/a": { "get": { "operationId": "getA", "responses": {} } },
              "/b": { "get": { "responses": {} } }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        assert_eq!(api.operations.len(), 1);
        assert_eq!(api.operations[0].name, "getA");
    }

    #[test]
    fn test_shared_id_head_pair_is_disambiguated() {
        let spec = minimal_with_paths(
            r#"{
              "/x": {
                "get": { "operationId": "foo", "responses": {} },
                "head": { "operationId": "foo", "responses": {} }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        let names: Vec<_> = api.operations.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "foo_head"]);
    }

    #[test]
    fn test_path_level_parameters_are_merged() {
        let spec = minimal_with_paths(
            r#"{
              "/pets/{petId}": {
                "parameters": [
                  { "name": "petId", "in": "path", "required": true,
                    "schema": { "type": "string" } }
                ],
                "get": {
                  "operationId": "getPet",
                  "parameters": [
                    { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
                  ],
                  "responses": {}
                }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        let op = &api.operations[0];
        assert_eq!(op.params.len(), 2);
        assert_eq!(op.path_params().count(), 1);
        assert_eq!(op.query_params().count(), 1);
    }

    #[test]
    fn test_operation_parameter_overrides_path_level() {
        let spec = minimal_with_paths(
            r#"{
              "/r": {
                "parameters": [
                  { "name": "limit", "in": "query", "schema": { "type": "string" } }
                ],
                "get": {
                  "operationId": "list",
                  "parameters": [
                    { "name": "limit", "in": "query", "required": true,
                      "schema": { "type": "integer" } }
                  ],
                  "responses": {}
                }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        let op = &api.operations[0];
        assert_eq!(op.params.len(), 1);
        assert!(op.params[0].required);
    }

    #[test]
    fn test_component_parameter_ref_is_resolved() {
        let spec = spec(
            r##"{
              "openapi": "3.0.0",
              "info": { "title": "T", "version": "1" },
              "paths": {
                "/r": {
                  "get": {
                    "operationId": "list",
                    "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                    "responses": {}
                  }
                }
              },
              "components": {
                "parameters": {
                  "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                }
              }
            }"##,
        );
        let api = normalize_spec(&spec, None);
        assert_eq!(api.operations[0].params[0].original_name, "limit");
    }

    #[test]
    fn test_path_parameters_forced_required() {
        let spec = minimal_with_paths(
            r#"{
              "/pets/{id}": {
                "get": {
                  "operationId": "getPet",
                  "parameters": [
                    { "name": "id", "in": "path", "schema": { "type": "string" } }
                  ],
                  "responses": {}
                }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        assert!(api.operations[0].params[0].required);
    }

    #[test]
    fn test_body_encoding_selection() {
        let spec = minimal_with_paths(
            r#"{
              "/j": {
                "post": {
                  "operationId": "postJson",
                  "requestBody": { "content": {
                    "application/json": { "schema": { "type": "object" } } } },
                  "responses": {}
                }
              },
              "/f": {
                "post": {
                  "operationId": "postForm",
                  "requestBody": { "content": {
                    "application/x-www-form-urlencoded": { "schema": { "type": "object" } } } },
                  "responses": {}
                }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        let by_name = |n: &str| {
            api.operations
                .iter()
                .find(|op| op.name == n)
                .unwrap()
                .body
                .clone()
                .unwrap()
        };
        assert_eq!(by_name("postForm").encoding, BodyEncoding::FormUrlEncoded);
        assert_eq!(by_name("postJson").encoding, BodyEncoding::Json);
    }

    #[test]
    fn test_response_pick_order() {
        let spec = minimal_with_paths(
            r#"{
              "/r": {
                "get": {
                  "operationId": "get",
                  "responses": {
                    "default": { "description": "d", "content": {
                      "application/json": { "schema": { "type": "string" } } } },
                    "201": { "description": "c", "content": {
                      "application/json": { "schema": { "type": "integer" } } } }
                  }
                }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        // 200 absent, so 201 wins over default.
        let node = api.operations[0].response.node.clone().unwrap();
        let super::super::schema::SchemaNode::Primitive(prim) = node else {
            panic!("expected primitive");
        };
        assert_eq!(prim.kind, super::super::schema::SchemaKind::Integer);
    }

    #[test]
    fn test_response_without_schema_is_none() {
        let spec = minimal_with_paths(
            r#"{
              "/r": {
                "delete": {
                  "operationId": "remove",
                  "responses": { "204": { "description": "gone" } }
                }
              }
            }"#,
        );
        let api = normalize_spec(&spec, None);
        assert!(api.operations[0].response.node.is_none());
    }

    #[test]
    fn test_servers_normalized_with_variables() {
        let spec = spec(
            r#"{
              "openapi": "3.0.0",
              "info": { "title": "T", "version": "1" },
              "servers": [
                { "url": "https://{env}.example.com",
                  "variables": { "env": { "default": "prod", "enum": ["prod", "dev"] } } }
              ],
              "paths": {}
            }"#,
        );
        let api = normalize_spec(&spec, None);
        assert_eq!(api.servers[0].default_url(), "https://prod.example.com");
        assert_eq!(api.servers[0].variables[0].enum_values, vec!["prod", "dev"]);
    }
}
