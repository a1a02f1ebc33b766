//! API-level IR for normalized operations.
//!
//! Everything the assembler needs, decoupled from the raw document
//! shape: resolved parameters, a chosen body encoding, the response
//! schema to validate against, and server templates with their
//! variable defaults.

use std::collections::BTreeMap;

use crate::spec::HttpMethod;

use super::schema::SchemaNode;

/// Where a parameter appears in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// Single resolved parameter.
#[derive(Debug, Clone)]
pub struct ParamIR {
    /// Identifier-safe name used in the generated method signature.
    pub name: String,
    /// Name as declared in the document, used for URL and query keys.
    pub original_name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub node: SchemaNode,
}

/// Request body wire encoding, chosen from the declared content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    FormUrlEncoded,
}

/// Resolved request body.
#[derive(Debug, Clone)]
pub struct BodyIR {
    pub encoding: BodyEncoding,
    pub required: bool,
    pub node: SchemaNode,
}

/// Response schema used to validate the parsed body, if any.
#[derive(Debug, Clone, Default)]
pub struct ResponseIR {
    pub node: Option<SchemaNode>,
}

/// One normalized API operation.
#[derive(Debug, Clone)]
pub struct OperationIR {
    /// Collision-free identifier, already run through naming.
    pub name: String,
    pub method: HttpMethod,
    /// URL template with `{param}` placeholders intact.
    pub path: String,
    pub summary: Option<String>,
    pub params: Vec<ParamIR>,
    pub body: Option<BodyIR>,
    pub response: ResponseIR,
}

impl OperationIR {
    pub fn path_params(&self) -> impl Iterator<Item = &ParamIR> {
        self.params
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
    }

    pub fn query_params(&self) -> impl Iterator<Item = &ParamIR> {
        self.params
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
    }

    pub fn header_params(&self) -> impl Iterator<Item = &ParamIR> {
        self.params
            .iter()
            .filter(|p| p.location == ParamLocation::Header)
    }
}

/// A server URL template variable with its declared default.
#[derive(Debug, Clone)]
pub struct ServerVariableIR {
    pub name: String,
    pub default: String,
    pub enum_values: Vec<String>,
}

/// A server entry: template plus variables.
#[derive(Debug, Clone)]
pub struct ServerIR {
    pub url: String,
    pub variables: Vec<ServerVariableIR>,
}

impl ServerIR {
    /// Substitute every variable's default into the URL template.
    pub fn default_url(&self) -> String {
        let mut url = self.url.clone();
        for var in &self.variables {
            url = url.replace(&format!("{{{}}}", var.name), &var.default);
        }
        url
    }
}

/// The normalized document, ready for analysis and assembly.
#[derive(Debug)]
pub struct ApiIR {
    pub title: String,
    pub version: String,
    pub servers: Vec<ServerIR>,
    pub operations: Vec<OperationIR>,
    /// Named schemas, normalized; shared read-only by the compiler.
    pub registry: BTreeMap<String, SchemaNode>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url_substitutes_all_variables() {
        let server = ServerIR {
            url: "https://{env}.example.com:{port}/api".into(),
            variables: vec![
                ServerVariableIR {
                    name: "env".into(),
                    default: "prod".into(),
                    enum_values: vec!["prod".into(), "dev".into()],
                },
                ServerVariableIR {
                    name: "port".into(),
                    default: "443".into(),
                    enum_values: vec![],
                },
            ],
        };
        assert_eq!(server.default_url(), "https://prod.example.com:443/api");
    }

    #[test]
    fn test_default_url_without_variables_is_verbatim() {
        let server = ServerIR {
            url: "https://api.example.com/v2".into(),
            variables: vec![],
        };
        assert_eq!(server.default_url(), "https://api.example.com/v2");
    }
}
