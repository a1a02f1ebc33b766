//! Client assembly: turns the analyzed IR into a complete output
//! module.
//!
//! Output order is fixed: banner, zod import, schema declarations in
//! the analyzer's emission order (with parallel structural types in
//! explicit-type mode), server resolution support when the document
//! declares servers, the error class, and finally the client class
//! with one method per operation.

use chrono::{SecondsFormat, Utc};

use crate::error::Error;

use super::api::{ApiIR, BodyEncoding, OperationIR, ParamIR, ParamLocation, ServerIR};
use super::compile::{CompileCtx, compile_schema};
use super::emit::Emit;
use super::graph::SchemaGraph;
use super::naming::{self, NamingConvention};
use super::schema::{Composition, Primitive, SchemaKind, SchemaNode};
use super::types::{
    TsClass, TsCtor, TsDecl, TsExpr, TsField, TsLiteral, TsMethod, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, Visibility,
};

/// Assembly knobs beyond the IR itself.
#[derive(Debug, Clone, Default)]
pub struct CodegenOptions {
    /// Input path or URL, echoed into the banner.
    pub source: String,
    /// Emit a structural type alongside every schema validator.
    pub explicit_types: bool,
}

const ERROR_CLASS: &str = r#"export class ApiError extends Error {
  constructor(
    public status: number,
    public statusText: string,
    public body: unknown,
  ) {
    super(`Request failed with status ${status} ${statusText}`);
    this.name = "ApiError";
  }
}"#;

/// Assemble the full output module.
pub fn assemble(
    api: &ApiIR,
    graph: &SchemaGraph,
    options: &CodegenOptions,
) -> Result<TsModule, Error> {
    let mut module = TsModule::default();

    module.decls.push(banner(api, options));
    module.decls.push(TsDecl::Import {
        items: vec!["z".into()],
        from: "zod".into(),
    });

    schema_decls(api, graph, options, &mut module)?;
    if !api.servers.is_empty() {
        server_decls(&api.servers, &mut module);
    }
    module.decls.push(TsDecl::Raw(ERROR_CLASS.into()));
    module.decls.push(request_options_interface());
    module.decls.push(TsDecl::Class(client_class(api, graph, options)?));

    Ok(module)
}

fn banner(api: &ApiIR, options: &CodegenOptions) -> TsDecl {
    TsDecl::Comment(vec![
        format!(
            "Generated by {} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
        format!(
            "at {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!("from {}", options.source),
        String::new(),
        format!("{} (version {})", api.title, api.version),
        String::new(),
        "Do not edit by hand.".to_string(),
    ])
}

fn schema_decls(
    api: &ApiIR,
    graph: &SchemaGraph,
    options: &CodegenOptions,
    module: &mut TsModule,
) -> Result<(), Error> {
    for name in &graph.emission_order {
        let Some(node) = api.registry.get(name) else {
            continue;
        };
        let ctx = CompileCtx {
            current: Some(name),
            circular: &graph.circular,
            registry: &api.registry,
        };
        let init = compile_schema(node, true, ctx)?;

        if options.explicit_types {
            module.decls.push(TsDecl::TypeAlias {
                name: name.clone(),
                ty: type_of(node, true),
                is_export: true,
            });
            module.decls.push(TsDecl::Const {
                name: name.clone(),
                ty: Some(TsType::Ref(format!("z.ZodType<{name}>"))),
                init,
                is_export: true,
            });
        } else {
            module.decls.push(TsDecl::Const {
                name: name.clone(),
                ty: None,
                init,
                is_export: true,
            });
        }
    }
    Ok(())
}

/// Structural type mirroring a schema node.
///
/// In explicit-type mode every named schema has a parallel type alias,
/// so references use the bare name; otherwise only the validator const
/// exists and references go through `z.infer`.
fn type_of(node: &SchemaNode, explicit: bool) -> TsType {
    match node {
        SchemaNode::Reference(name) => {
            if explicit {
                TsType::Ref(name.clone())
            } else {
                TsType::Ref(format!("z.infer<typeof {name}>"))
            }
        }
        SchemaNode::Composition(comp) => match comp {
            Composition::AnyOf(members) | Composition::OneOf(members) => {
                TsType::Union(members.iter().map(|m| type_of(m, explicit)).collect())
            }
            Composition::AllOf(members) if !members.is_empty() => {
                TsType::Intersection(members.iter().map(|m| type_of(m, explicit)).collect())
            }
            _ => TsType::Primitive(TsPrimitive::Unknown),
        },
        SchemaNode::Primitive(prim) => type_of_primitive(prim, explicit),
    }
}

fn type_of_primitive(prim: &Primitive, explicit: bool) -> TsType {
    if !prim.enum_values.is_empty() {
        let members = prim
            .enum_values
            .iter()
            .map(|v| {
                TsType::Literal(match v {
                    crate::spec::EnumValue::String(s) => TsLiteral::String(s.clone()),
                    crate::spec::EnumValue::Integer(i) => TsLiteral::Int(*i),
                    crate::spec::EnumValue::Float(f) => TsLiteral::Number(*f),
                    crate::spec::EnumValue::Bool(b) => TsLiteral::Bool(*b),
                    crate::spec::EnumValue::Null => TsLiteral::Null,
                })
            })
            .collect();
        return TsType::Union(members);
    }

    match prim.kind {
        SchemaKind::String => TsType::Primitive(TsPrimitive::String),
        SchemaKind::Number | SchemaKind::Integer => TsType::Primitive(TsPrimitive::Number),
        SchemaKind::Boolean => TsType::Primitive(TsPrimitive::Boolean),
        SchemaKind::Unknown => TsType::Primitive(TsPrimitive::Unknown),
        SchemaKind::Array => TsType::Array(Box::new(
            prim.items
                .as_ref()
                .map(|items| type_of(items, explicit))
                .unwrap_or(TsType::Primitive(TsPrimitive::Unknown)),
        )),
        SchemaKind::Object => {
            if prim.properties.is_empty() {
                TsType::Record {
                    key: Box::new(TsType::Primitive(TsPrimitive::String)),
                    value: Box::new(TsType::Primitive(TsPrimitive::Unknown)),
                }
            } else {
                TsType::Object(
                    prim.properties
                        .iter()
                        .map(|p| TsProp {
                            name: p.name.clone(),
                            ty: type_of(&p.node, explicit),
                            optional: !p.required,
                        })
                        .collect(),
                )
            }
        }
    }
}

fn server_decls(servers: &[ServerIR], module: &mut TsModule) {
    module.decls.push(TsDecl::Interface {
        name: "ServerConfiguration".into(),
        props: vec![
            TsProp {
                name: "url".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                optional: false,
            },
            TsProp {
                name: "variables".into(),
                ty: TsType::Record {
                    key: Box::new(TsType::Primitive(TsPrimitive::String)),
                    value: Box::new(TsType::Ref(
                        "{ default: string; enum?: string[] }".into(),
                    )),
                },
                optional: false,
            },
        ],
        is_export: true,
    });

    let entries = servers
        .iter()
        .map(|server| {
            let variables = server
                .variables
                .iter()
                .map(|var| {
                    let mut fields =
                        vec![("default".to_string(), TsExpr::str(var.default.clone()))];
                    if !var.enum_values.is_empty() {
                        fields.push((
                            "enum".to_string(),
                            TsExpr::Array(
                                var.enum_values
                                    .iter()
                                    .map(|v| TsExpr::str(v.clone()))
                                    .collect(),
                            ),
                        ));
                    }
                    (var.name.clone(), TsExpr::Object(fields))
                })
                .collect();
            TsExpr::Object(vec![
                ("url".into(), TsExpr::str(server.url.clone())),
                ("variables".into(), TsExpr::Object(variables)),
            ])
        })
        .collect();
    module.decls.push(TsDecl::Const {
        name: "servers".into(),
        ty: Some(TsType::Array(Box::new(TsType::Ref(
            "ServerConfiguration".into(),
        )))),
        init: TsExpr::Array(entries),
        is_export: true,
    });

    module.decls.push(TsDecl::Const {
        name: "defaultBaseUrl".into(),
        ty: None,
        init: TsExpr::str(servers[0].default_url()),
        is_export: true,
    });

    module.decls.push(TsDecl::Interface {
        name: "ClientOptions".into(),
        props: vec![
            TsProp {
                name: "baseUrl".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                optional: true,
            },
            TsProp {
                name: "serverIndex".into(),
                ty: TsType::Primitive(TsPrimitive::Number),
                optional: true,
            },
            TsProp {
                name: "serverVariables".into(),
                ty: TsType::Record {
                    key: Box::new(TsType::Primitive(TsPrimitive::String)),
                    value: Box::new(TsType::Primitive(TsPrimitive::String)),
                },
                optional: true,
            },
        ],
        is_export: true,
    });

    module.decls.push(TsDecl::Function(super::types::TsFunction {
        name: "resolveServerUrl".into(),
        params: vec![
            TsParam {
                name: "serverIndex".into(),
                ty: Some(TsType::Primitive(TsPrimitive::Number)),
                optional: false,
                default: Some(TsExpr::int(0)),
            },
            TsParam {
                name: "serverVariables".into(),
                ty: Some(TsType::Record {
                    key: Box::new(TsType::Primitive(TsPrimitive::String)),
                    value: Box::new(TsType::Primitive(TsPrimitive::String)),
                }),
                optional: false,
                default: Some(TsExpr::Object(vec![])),
            },
        ],
        return_type: Some(TsType::Primitive(TsPrimitive::String)),
        body: vec![TsStmt::Raw(
            r"const server = servers[serverIndex] ?? servers[0];
let url = server.url;
for (const [name, variable] of Object.entries(server.variables)) {
  const value = serverVariables[name] ?? variable.default;
  url = url.replace(`{${name}}`, value);
}
return url;"
                .into(),
        )],
        is_async: false,
        is_export: true,
    }));
}

fn request_options_interface() -> TsDecl {
    let unknown_record = || TsType::Record {
        key: Box::new(TsType::Primitive(TsPrimitive::String)),
        value: Box::new(TsType::Primitive(TsPrimitive::Unknown)),
    };
    TsDecl::Interface {
        name: "RequestOptions".into(),
        props: vec![
            TsProp {
                name: "params".into(),
                ty: unknown_record(),
                optional: true,
            },
            TsProp {
                name: "headers".into(),
                ty: unknown_record(),
                optional: true,
            },
            TsProp {
                name: "cookies".into(),
                ty: unknown_record(),
                optional: true,
            },
            TsProp {
                name: "body".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                optional: true,
            },
            TsProp {
                name: "contentType".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                optional: true,
            },
        ],
        is_export: false,
    }
}

/// Class name derived from the document title.
pub fn client_name(title: &str) -> String {
    let base = naming::sanitize(&NamingConvention::PascalCase.apply(title));
    format!("{base}Client")
}

fn client_class(
    api: &ApiIR,
    graph: &SchemaGraph,
    options: &CodegenOptions,
) -> Result<TsClass, Error> {
    let has_servers = !api.servers.is_empty();

    let ctor = if has_servers {
        TsCtor {
            params: vec![TsParam {
                name: "options".into(),
                ty: Some(TsType::Ref("ClientOptions".into())),
                optional: false,
                default: Some(TsExpr::Object(vec![])),
            }],
            body: vec![TsStmt::Raw(
                "this.baseUrl = options.baseUrl ?? resolveServerUrl(options.serverIndex, options.serverVariables);"
                    .into(),
            )],
        }
    } else {
        TsCtor {
            params: vec![TsParam {
                name: "baseUrl".into(),
                ty: Some(TsType::Primitive(TsPrimitive::String)),
                optional: false,
                default: Some(TsExpr::str("/")),
            }],
            body: vec![TsStmt::Raw("this.baseUrl = baseUrl;".into())],
        }
    };

    let mut methods = vec![
        prepare_request_hook(),
        handle_response_hook(),
        request_dispatch(),
    ];
    for op in &api.operations {
        methods.push(operation_method(api, graph, op, options.explicit_types)?);
    }

    Ok(TsClass {
        name: client_name(&api.title),
        is_export: true,
        fields: vec![TsField {
            name: "baseUrl".into(),
            ty: TsType::Primitive(TsPrimitive::String),
            visibility: Visibility::Public,
        }],
        ctor: Some(ctor),
        methods,
    })
}

/// Subclass hook: adjust outgoing request options. Pass-through by
/// default.
fn prepare_request_hook() -> TsMethod {
    TsMethod {
        name: "prepareRequest".into(),
        doc: Some("Override to customize outgoing request options.".into()),
        visibility: Visibility::Protected,
        params: vec![TsParam::new("init", TsType::Ref("RequestInit".into()))],
        return_type: Some(TsType::Ref("RequestInit".into())),
        body: vec![TsStmt::Return(Some(TsExpr::ident("init")))],
        is_async: false,
    }
}

/// Subclass hook: intercept the raw response before error-checking.
fn handle_response_hook() -> TsMethod {
    TsMethod {
        name: "handleResponse".into(),
        doc: Some("Override to intercept or retry the raw response.".into()),
        visibility: Visibility::Protected,
        params: vec![TsParam::new("response", TsType::Ref("Response".into()))],
        return_type: Some(TsType::Ref("Promise<Response>".into())),
        body: vec![TsStmt::Return(Some(TsExpr::ident("response")))],
        is_async: true,
    }
}

fn request_dispatch() -> TsMethod {
    TsMethod {
        name: "request".into(),
        doc: None,
        visibility: Visibility::Private,
        params: vec![
            TsParam::new("method", TsType::Primitive(TsPrimitive::String)),
            TsParam::new("path", TsType::Primitive(TsPrimitive::String)),
            TsParam {
                name: "options".into(),
                ty: Some(TsType::Ref("RequestOptions".into())),
                optional: false,
                default: Some(TsExpr::Object(vec![])),
            },
        ],
        return_type: Some(TsType::Ref("Promise<unknown>".into())),
        body: vec![TsStmt::Raw(
            r#"let url = this.baseUrl.replace(/\/+$/, "") + path;
const query = new URLSearchParams();
for (const [key, value] of Object.entries(options.params ?? {})) {
  if (value !== undefined) query.append(key, String(value));
}
const qs = query.toString();
if (qs) url += `?${qs}`;
const headers: Record<string, string> = {};
for (const [key, value] of Object.entries(options.headers ?? {})) {
  if (value !== undefined) headers[key] = String(value);
}
const cookies = Object.entries(options.cookies ?? {}).filter(([, value]) => value !== undefined);
if (cookies.length > 0) {
  headers["Cookie"] = cookies.map(([key, value]) => `${key}=${String(value)}`).join("; ");
}
if (options.contentType) headers["Content-Type"] = options.contentType;
const init = this.prepareRequest({ method, headers, body: options.body });
const response = await this.handleResponse(await fetch(url, init));
const text = await response.text();
if (!response.ok) {
  let body: unknown = text;
  try {
    body = JSON.parse(text);
  } catch {
    // leave raw text
  }
  throw new ApiError(response.status, response.statusText, body);
}
return text ? JSON.parse(text) : undefined;"#
                .into(),
        )],
        is_async: true,
    }
}

/// Signature order: required parameters first, then optionals, so the
/// emitted TypeScript stays legal.
fn signature_params(op: &OperationIR) -> Vec<(&ParamIR, bool)> {
    let mut params: Vec<(&ParamIR, bool)> = op.params.iter().map(|p| (p, p.required)).collect();
    params.sort_by_key(|(_, required)| !required);
    params
}

fn path_expr(op: &OperationIR) -> TsExpr {
    if op.path_params().next().is_none() {
        return TsExpr::str(op.path.clone());
    }
    let mut template = op.path.clone();
    for param in op.path_params() {
        template = template.replace(
            &format!("{{{}}}", param.original_name),
            &format!("${{encodeURIComponent(String({}))}}", param.name),
        );
    }
    TsExpr::Raw(format!("`{template}`"))
}

fn param_map(params: Vec<(&str, &str)>) -> TsExpr {
    TsExpr::Object(
        params
            .into_iter()
            .map(|(original, name)| (original.to_string(), TsExpr::ident(name)))
            .collect(),
    )
}

fn operation_method(
    api: &ApiIR,
    graph: &SchemaGraph,
    op: &OperationIR,
    explicit: bool,
) -> Result<TsMethod, Error> {
    let ctx = CompileCtx {
        current: None,
        circular: &graph.circular,
        registry: &api.registry,
    };

    let mut ts_params = Vec::new();
    for (param, required) in signature_params(op) {
        ts_params.push(TsParam {
            name: param.name.clone(),
            ty: Some(type_of(&param.node, explicit)),
            optional: !required,
            default: None,
        });
    }
    if let Some(body) = &op.body {
        let ts_param = TsParam {
            name: "body".into(),
            ty: Some(type_of(&body.node, explicit)),
            optional: !body.required,
            default: None,
        };
        // Optional body goes last to keep required parameters first.
        if body.required {
            let split = ts_params.iter().position(|p| p.optional).unwrap_or(ts_params.len());
            ts_params.insert(split, ts_param);
        } else {
            ts_params.push(ts_param);
        }
    }

    let mut body_stmts = Vec::new();
    let mut request_options: Vec<(String, TsExpr)> = Vec::new();

    let query: Vec<_> = op
        .query_params()
        .map(|p| (p.original_name.as_str(), p.name.as_str()))
        .collect();
    if !query.is_empty() {
        request_options.push(("params".into(), param_map(query)));
    }
    let headers: Vec<_> = op
        .header_params()
        .map(|p| (p.original_name.as_str(), p.name.as_str()))
        .collect();
    if !headers.is_empty() {
        request_options.push(("headers".into(), param_map(headers)));
    }
    let cookies: Vec<_> = op
        .params
        .iter()
        .filter(|p| p.location == ParamLocation::Cookie)
        .map(|p| (p.original_name.as_str(), p.name.as_str()))
        .collect();
    if !cookies.is_empty() {
        request_options.push(("cookies".into(), param_map(cookies)));
    }

    if let Some(body) = &op.body {
        let (serialize, content_type) = match body.encoding {
            BodyEncoding::Json => ("JSON.stringify(body)", "application/json"),
            BodyEncoding::FormUrlEncoded => (
                "new URLSearchParams(body as Record<string, string>).toString()",
                "application/x-www-form-urlencoded",
            ),
        };
        let init = if body.required {
            serialize.to_string()
        } else {
            format!("body === undefined ? undefined : {serialize}")
        };
        body_stmts.push(TsStmt::Const {
            name: "payload".into(),
            init: TsExpr::Raw(init),
        });
        request_options.push(("body".into(), TsExpr::ident("payload")));
        request_options.push(("contentType".into(), TsExpr::str(content_type)));
    }

    let mut request_args = vec![TsExpr::str(op.method.as_str()), path_expr(op)];
    if !request_options.is_empty() {
        request_args.push(TsExpr::Object(request_options));
    }
    let call = TsExpr::ident("this").method("request", request_args);
    body_stmts.push(TsStmt::Const {
        name: "data".into(),
        init: TsExpr::Raw(format!("await {}", call.emit())),
    });

    let return_type = match &op.response.node {
        Some(node) => {
            let validator = compile_schema(node, true, ctx)?;
            body_stmts.push(TsStmt::Return(Some(
                validator.method("parse", vec![TsExpr::ident("data")]),
            )));
            TsType::Ref(format!("Promise<{}>", type_of(node, explicit).emit()))
        }
        None => {
            body_stmts.push(TsStmt::Return(Some(TsExpr::ident("data"))));
            TsType::Ref("Promise<unknown>".into())
        }
    };

    Ok(TsMethod {
        name: op.name.clone(),
        doc: op.summary.clone(),
        visibility: Visibility::Public,
        params: ts_params,
        return_type: Some(return_type),
        body: body_stmts,
        is_async: true,
    })
}
