//! Schema compiler: one [`SchemaNode`] in, one zod validation
//! expression out.
//!
//! The dispatch order mirrors the precedence baked into the tagged
//! union: reference, then composition operators, then enum literals,
//! then the primitive kind. Malformed input compiles deterministically
//! to the permissive `z.unknown()` rather than failing the run; the
//! only fatal condition here is an empty `allOf`, which has no
//! sensible intersection.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::Error;
use crate::spec::EnumValue;

use super::schema::{Composition, Constraints, Primitive, SchemaKind, SchemaNode};
use super::types::{TsExpr, TsLiteral, zod};
use super::utils::format_number;

/// Context threaded through every recursive call; replaces the mutable
/// "current schema" global the naive implementation would reach for.
#[derive(Debug, Clone, Copy)]
pub struct CompileCtx<'a> {
    /// Name of the named schema currently being compiled, if any.
    pub current: Option<&'a str>,
    /// Schemas that participate in a reference cycle.
    pub circular: &'a BTreeSet<String>,
    /// The shared schema registry, read-only during compilation.
    pub registry: &'a BTreeMap<String, SchemaNode>,
}

/// Compile a schema node into a zod expression.
pub fn compile_schema(
    node: &SchemaNode,
    required: bool,
    ctx: CompileCtx<'_>,
) -> Result<TsExpr, Error> {
    let expr = match node {
        SchemaNode::Reference(target) => compile_reference(target, ctx),
        SchemaNode::Composition(comp) => compile_composition(comp, ctx)?,
        SchemaNode::Primitive(prim) => compile_primitive(prim, ctx)?,
    };
    Ok(finish(expr, required))
}

/// Wrap in `.optional()` unless the position requires a value.
fn finish(expr: TsExpr, required: bool) -> TsExpr {
    if required {
        expr
    } else {
        expr.method("optional", vec![])
    }
}

fn compile_reference(target: &str, ctx: CompileCtx<'_>) -> TsExpr {
    if !ctx.registry.contains_key(target) {
        warn!(reference = target, "dangling schema reference, degrading to unknown");
        return zod("unknown", vec![]);
    }

    // Deferred construction is only needed when both ends of the edge
    // sit inside a cycle; everything else was declared earlier.
    let needs_lazy = ctx.current.is_some_and(|c| ctx.circular.contains(c))
        && ctx.circular.contains(target);
    if needs_lazy {
        zod(
            "lazy",
            vec![TsExpr::Arrow {
                params: vec![],
                body: Box::new(TsExpr::ident(target)),
            }],
        )
    } else {
        TsExpr::ident(target)
    }
}

fn compile_composition(comp: &Composition, ctx: CompileCtx<'_>) -> Result<TsExpr, Error> {
    match comp {
        // Optionality belongs to the container, so members always
        // compile as required.
        Composition::AnyOf(members) | Composition::OneOf(members) => {
            compile_union(members, ctx)
        }
        Composition::AllOf(members) => compile_intersection(members, ctx),
        Composition::Not(inner) => {
            let inner_expr = compile_schema(inner, true, ctx)?;
            let predicate = TsExpr::Arrow {
                params: vec!["value".into()],
                body: Box::new(TsExpr::Not(Box::new(
                    inner_expr
                        .method("safeParse", vec![TsExpr::ident("value")])
                        .member("success"),
                ))),
            };
            Ok(zod("any", vec![]).method("refine", vec![predicate]))
        }
    }
}

fn compile_union(members: &[SchemaNode], ctx: CompileCtx<'_>) -> Result<TsExpr, Error> {
    let mut compiled = members
        .iter()
        .map(|m| compile_schema(m, true, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    match compiled.len() {
        0 => {
            warn!("union with no members, degrading to unknown");
            Ok(zod("unknown", vec![]))
        }
        1 => Ok(compiled.remove(0)),
        _ => Ok(zod("union", vec![TsExpr::Array(compiled)])),
    }
}

/// Left fold: the first member seeds the chain, each following member
/// intersects with the accumulated result.
fn compile_intersection(members: &[SchemaNode], ctx: CompileCtx<'_>) -> Result<TsExpr, Error> {
    let mut iter = members.iter();
    let Some(first) = iter.next() else {
        return Err(Error::EmptyAllOf(
            ctx.current.unwrap_or("<inline>").to_string(),
        ));
    };
    let mut acc = compile_schema(first, true, ctx)?;
    for member in iter {
        let rhs = compile_schema(member, true, ctx)?;
        acc = acc.method("and", vec![rhs]);
    }
    Ok(acc)
}

fn compile_primitive(prim: &Primitive, ctx: CompileCtx<'_>) -> Result<TsExpr, Error> {
    if !prim.enum_values.is_empty() {
        return Ok(with_default(compile_enum(&prim.enum_values), prim));
    }

    let expr = match prim.kind {
        SchemaKind::Object => compile_object(prim, ctx)?,
        SchemaKind::Array => compile_array(prim, ctx)?,
        SchemaKind::Integer => with_default(compile_numeric(&prim.constraints, true), prim),
        SchemaKind::Number => with_default(compile_numeric(&prim.constraints, false), prim),
        SchemaKind::String => compile_string(prim),
        SchemaKind::Boolean => with_default(zod("boolean", vec![]), prim),
        SchemaKind::Unknown => zod("unknown", vec![]),
    };
    Ok(expr)
}

fn compile_enum(values: &[EnumValue]) -> TsExpr {
    let all_strings = values.iter().all(|v| matches!(v, EnumValue::String(_)));
    if all_strings {
        let items = values
            .iter()
            .filter_map(|v| match v {
                EnumValue::String(s) => Some(TsExpr::str(s.clone())),
                _ => None,
            })
            .collect();
        return zod("enum", vec![TsExpr::Array(items)]);
    }

    // Mixed, numeric, or boolean enums become exact-value validators.
    let mut literals: Vec<TsExpr> = values
        .iter()
        .map(|v| {
            let lit = match v {
                EnumValue::String(s) => TsLiteral::String(s.clone()),
                EnumValue::Integer(i) => TsLiteral::Int(*i),
                EnumValue::Float(f) => TsLiteral::Number(*f),
                EnumValue::Bool(b) => TsLiteral::Bool(*b),
                EnumValue::Null => TsLiteral::Null,
            };
            zod("literal", vec![TsExpr::Literal(lit)])
        })
        .collect();
    if literals.len() == 1 {
        literals.remove(0)
    } else {
        zod("union", vec![TsExpr::Array(literals)])
    }
}

fn compile_object(prim: &Primitive, ctx: CompileCtx<'_>) -> Result<TsExpr, Error> {
    if prim.properties.is_empty() {
        // Free-form object: an open string-keyed map, never an empty
        // fixed shape.
        return Ok(zod("record", vec![zod("unknown", vec![])]));
    }

    let mut entries = Vec::with_capacity(prim.properties.len());
    for prop in &prim.properties {
        let value = compile_schema(&prop.node, prop.required, ctx)?;
        entries.push((prop.name.clone(), value));
    }
    let mut expr = zod("object", vec![TsExpr::Object(entries)]);

    if let Some(min) = prim.constraints.min_properties {
        expr = expr.method("refine", vec![key_count_predicate(">=", min)]);
    }
    if let Some(max) = prim.constraints.max_properties {
        expr = expr.method("refine", vec![key_count_predicate("<=", max)]);
    }
    Ok(expr)
}

fn key_count_predicate(op: &str, bound: u64) -> TsExpr {
    TsExpr::Arrow {
        params: vec!["obj".into()],
        body: Box::new(TsExpr::Raw(format!(
            "Object.keys(obj).length {op} {bound}"
        ))),
    }
}

fn compile_array(prim: &Primitive, ctx: CompileCtx<'_>) -> Result<TsExpr, Error> {
    let items = match &prim.items {
        Some(items) => compile_schema(items, true, ctx)?,
        None => zod("unknown", vec![]),
    };
    let mut expr = zod("array", vec![items]);
    if let Some(min) = prim.constraints.min_items {
        expr = expr.method("min", vec![TsExpr::int(min as i64)]);
    }
    if let Some(max) = prim.constraints.max_items {
        expr = expr.method("max", vec![TsExpr::int(max as i64)]);
    }
    Ok(expr)
}

fn compile_numeric(constraints: &Constraints, integer: bool) -> TsExpr {
    let mut expr = zod("number", vec![]);
    if integer {
        expr = expr.method("int", vec![]);
    }

    match (constraints.minimum, constraints.exclusive_minimum) {
        (_, Some(min)) if integer => {
            // Smallest integer strictly above the bound, even when the
            // document declares a fractional one.
            expr = expr.method("gte", vec![TsExpr::num(min.floor() + 1.0)]);
        }
        (_, Some(min)) => {
            expr = expr.method("gt", vec![TsExpr::num(min)]);
        }
        (Some(min), None) => {
            expr = expr.method("gte", vec![TsExpr::num(min)]);
        }
        (None, None) => {}
    }
    match (constraints.maximum, constraints.exclusive_maximum) {
        (_, Some(max)) if integer => {
            expr = expr.method("lte", vec![TsExpr::num(max.ceil() - 1.0)]);
        }
        (_, Some(max)) => {
            expr = expr.method("lt", vec![TsExpr::num(max)]);
        }
        (Some(max), None) => {
            expr = expr.method("lte", vec![TsExpr::num(max)]);
        }
        (None, None) => {}
    }

    if let Some(step) = constraints.multiple_of {
        expr = expr.method(
            "refine",
            vec![TsExpr::Arrow {
                params: vec!["value".into()],
                body: Box::new(TsExpr::Raw(format!(
                    "value % {} === 0",
                    format_number(step)
                ))),
            }],
        );
    }
    expr
}

fn compile_string(prim: &Primitive) -> TsExpr {
    let mut expr = zod("string", vec![]);

    if let Some(format) = prim.format.as_deref() {
        match format {
            "email" => expr = expr.method("email", vec![]),
            "url" | "uri" => expr = expr.method("url", vec![]),
            "uuid" => expr = expr.method("uuid", vec![]),
            "date" => expr = expr.method("date", vec![]),
            "date-time" => expr = expr.method("datetime", vec![]),
            "time" => expr = expr.method("time", vec![]),
            other => {
                debug!(format = other, "unrecognized string format, using plain string");
            }
        }
    }

    if let Some(min) = prim.constraints.min_length {
        expr = expr.method("min", vec![TsExpr::int(min as i64)]);
    }
    if let Some(max) = prim.constraints.max_length {
        expr = expr.method("max", vec![TsExpr::int(max as i64)]);
    }
    if let Some(pattern) = &prim.constraints.pattern {
        expr = expr.method(
            "regex",
            vec![TsExpr::New {
                callee: Box::new(TsExpr::ident("RegExp")),
                args: vec![TsExpr::str(pattern.clone())],
            }],
        );
    }

    with_default(expr, prim)
}

/// Append `.default(...)` for scalar defaults.
fn with_default(expr: TsExpr, prim: &Primitive) -> TsExpr {
    let Some(default) = &prim.default else {
        return expr;
    };
    let lit = match default {
        serde_json::Value::String(s) => TsLiteral::String(s.clone()),
        serde_json::Value::Bool(b) => TsLiteral::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => TsLiteral::Int(i),
            None => TsLiteral::Number(n.as_f64().unwrap_or(0.0)),
        },
        _ => return expr,
    };
    expr.method("default", vec![TsExpr::Literal(lit)])
}
