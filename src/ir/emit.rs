//! TypeScript text emission via the `Emit` trait.
//!
//! Purely mechanical string building; anything interesting happened
//! before the algebra was constructed.

use super::types::{
    TsClass, TsDecl, TsExpr, TsFunction, TsLiteral, TsMethod, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, Visibility,
};
use super::utils::{escape_js_string, format_number, quote_if_needed};

/// Convert an algebra node to its TypeScript string representation.
pub trait Emit {
    fn emit(&self) -> String;
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => format_number(*n),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => {
                format!("{}({})", callee.emit(), emit_args(args))
            }
            TsExpr::Method { recv, name, args } => {
                format!("{}.{}({})", recv.emit(), name, emit_args(args))
            }
            TsExpr::Member { object, prop } => format!("{}.{}", object.emit(), prop),
            TsExpr::Arrow { params, body } => {
                format!("({}) => {}", params.join(", "), body.emit())
            }
            TsExpr::Array(items) => {
                format!("[{}]", emit_args(items))
            }
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = entries
                        .iter()
                        .map(|(k, v)| format!("{}: {}", quote_if_needed(k), v.emit()))
                        .collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::New { callee, args } => {
                format!("new {}({})", callee.emit(), emit_args(args))
            }
            TsExpr::Not(inner) => format!("!{}", inner.emit()),
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

fn emit_args(args: &[TsExpr]) -> String {
    args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ")
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => types
                .iter()
                .map(Emit::emit)
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", quote_if_needed(&self.name), opt, self.ty.emit())
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        let ty = self
            .ty
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        let default = self
            .default
            .as_ref()
            .map(|d| format!(" = {}", d.emit()))
            .unwrap_or_default();
        format!("{}{}{}{}", self.name, opt, ty, default)
    }
}

impl TsStmt {
    /// Emit with an indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::Const { name, init } => {
                format!("{}const {} = {};\n", prefix, name, init.emit())
            }
            TsStmt::Expr(expr) => format!("{}{};\n", prefix, expr.emit()),
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{}return {};\n", prefix, e.emit()),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If { cond, then_body } => {
                let mut out = format!("{}if ({}) {{\n", prefix, cond.emit());
                for stmt in then_body {
                    out.push_str(&stmt.emit_indented(indent + 1));
                }
                out.push_str(&format!("{prefix}}}\n"));
                out
            }
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

fn emit_params(params: &[TsParam]) -> String {
    params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ")
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        let asyn = if self.is_async { "async " } else { "" };
        let ret = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        let mut out = format!(
            "{}{}function {}({}){} {{\n",
            export,
            asyn,
            self.name,
            emit_params(&self.params),
            ret
        );
        for stmt in &self.body {
            out.push_str(&stmt.emit_indented(1));
        }
        out.push_str("}\n");
        out
    }
}

impl Visibility {
    fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "",
            Visibility::Protected => "protected ",
            Visibility::Private => "private ",
        }
    }
}

impl Emit for TsMethod {
    fn emit(&self) -> String {
        let asyn = if self.is_async { "async " } else { "" };
        let ret = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        let mut out = String::new();
        if let Some(doc) = &self.doc {
            out.push_str(&format!("  /** {doc} */\n"));
        }
        out.push_str(&format!(
            "  {}{}{}({}){} {{\n",
            self.visibility.keyword(),
            asyn,
            self.name,
            emit_params(&self.params),
            ret
        ));
        for stmt in &self.body {
            out.push_str(&stmt.emit_indented(2));
        }
        out.push_str("  }\n");
        out
    }
}

impl Emit for TsClass {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        let mut out = format!("{}class {} {{\n", export, self.name);
        for field in &self.fields {
            out.push_str(&format!(
                "  {}{}: {};\n",
                field.visibility.keyword(),
                field.name,
                field.ty.emit()
            ));
        }
        if let Some(ctor) = &self.ctor {
            if !self.fields.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("  constructor({}) {{\n", emit_params(&ctor.params)));
            for stmt in &ctor.body {
                out.push_str(&stmt.emit_indented(2));
            }
            out.push_str("  }\n");
        }
        for method in &self.methods {
            out.push('\n');
            out.push_str(&method.emit());
        }
        out.push_str("}\n");
        out
    }
}

impl Emit for TsDecl {
    fn emit(&self) -> String {
        match self {
            TsDecl::Comment(lines) => {
                let mut out = String::new();
                for line in lines {
                    if line.is_empty() {
                        out.push_str("//\n");
                    } else {
                        out.push_str(&format!("// {line}\n"));
                    }
                }
                out
            }
            TsDecl::Import { items, from } => {
                format!("import {{ {} }} from \"{}\";\n", items.join(", "), from)
            }
            TsDecl::Const {
                name,
                ty,
                init,
                is_export,
            } => {
                let export = if *is_export { "export " } else { "" };
                let ty_str = ty
                    .as_ref()
                    .map(|t| format!(": {}", t.emit()))
                    .unwrap_or_default();
                format!("{}const {}{} = {};\n", export, name, ty_str, init.emit())
            }
            TsDecl::TypeAlias {
                name,
                ty,
                is_export,
            } => {
                let export = if *is_export { "export " } else { "" };
                format!("{}type {} = {};\n", export, name, ty.emit())
            }
            TsDecl::Interface {
                name,
                props,
                is_export,
            } => {
                let export = if *is_export { "export " } else { "" };
                let mut out = format!("{export}interface {name} {{\n");
                for prop in props {
                    out.push_str(&format!("  {};\n", prop.emit()));
                }
                out.push_str("}\n");
                out
            }
            TsDecl::Function(func) => func.emit(),
            TsDecl::Class(class) => class.emit(),
            TsDecl::Raw(code) => {
                let mut out = code.clone();
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
        }
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut out = String::new();
        for decl in &self.decls {
            out.push_str(&decl.emit());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::super::types::{TsCtor, TsField, zod};
    use super::*;

    #[test]
    fn test_emit_literals() {
        assert_eq!(TsLiteral::String("hi".into()).emit(), "\"hi\"");
        assert_eq!(TsLiteral::Int(-99).emit(), "-99");
        assert_eq!(TsLiteral::Number(1.5).emit(), "1.5");
        assert_eq!(TsLiteral::Number(2.0).emit(), "2");
        assert_eq!(TsLiteral::Bool(true).emit(), "true");
        assert_eq!(TsLiteral::Null.emit(), "null");
    }

    #[test]
    fn test_emit_zod_chain() {
        let expr = zod("string", vec![])
            .method("min", vec![TsExpr::int(1)])
            .method("optional", vec![]);
        assert_eq!(expr.emit(), "z.string().min(1).optional()");
    }

    #[test]
    fn test_emit_arrow_and_not() {
        let expr = TsExpr::Arrow {
            params: vec!["value".into()],
            body: Box::new(TsExpr::Not(Box::new(
                TsExpr::ident("Inner")
                    .method("safeParse", vec![TsExpr::ident("value")])
                    .member("success"),
            ))),
        };
        assert_eq!(expr.emit(), "(value) => !Inner.safeParse(value).success");
    }

    #[test]
    fn test_emit_object_with_quoted_keys() {
        let expr = TsExpr::Object(vec![
            ("name".into(), zod("string", vec![])),
            ("foo-bar".into(), zod("number", vec![])),
        ]);
        assert_eq!(expr.emit(), "{ name: z.string(), \"foo-bar\": z.number() }");
    }

    #[test]
    fn test_emit_union_array_type() {
        let ty = TsType::Array(Box::new(TsType::Union(vec![
            TsType::Primitive(TsPrimitive::String),
            TsType::Primitive(TsPrimitive::Null),
        ])));
        assert_eq!(ty.emit(), "(string | null)[]");
    }

    #[test]
    fn test_emit_interface() {
        let decl = TsDecl::Interface {
            name: "Options".into(),
            props: vec![TsProp {
                name: "baseUrl".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                optional: true,
            }],
            is_export: true,
        };
        assert_eq!(
            decl.emit(),
            "export interface Options {\n  baseUrl?: string;\n}\n"
        );
    }

    #[test]
    fn test_emit_class_with_hook_method() {
        let class = TsClass {
            name: "Client".into(),
            is_export: true,
            fields: vec![TsField {
                name: "baseUrl".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                visibility: Visibility::Public,
            }],
            ctor: Some(TsCtor {
                params: vec![TsParam {
                    name: "baseUrl".into(),
                    ty: Some(TsType::Primitive(TsPrimitive::String)),
                    optional: false,
                    default: Some(TsExpr::str("/")),
                }],
                body: vec![TsStmt::Raw("this.baseUrl = baseUrl;".into())],
            }),
            methods: vec![TsMethod {
                name: "prepareRequest".into(),
                doc: None,
                visibility: Visibility::Protected,
                params: vec![TsParam::new("init", TsType::Ref("RequestInit".into()))],
                return_type: Some(TsType::Ref("RequestInit".into())),
                body: vec![TsStmt::Return(Some(TsExpr::ident("init")))],
                is_async: false,
            }],
        };
        let out = class.emit();
        assert!(out.contains("export class Client {"));
        assert!(out.contains("constructor(baseUrl: string = \"/\") {"));
        assert!(out.contains("protected prepareRequest(init: RequestInit): RequestInit {"));
    }

    #[test]
    fn test_emit_const_with_type_annotation() {
        let decl = TsDecl::Const {
            name: "Pet".into(),
            ty: Some(TsType::Ref("z.ZodType<Pet>".into())),
            init: zod("object", vec![TsExpr::Object(vec![])]),
            is_export: true,
        };
        assert_eq!(
            decl.emit(),
            "export const Pet: z.ZodType<Pet> = z.object({});\n"
        );
    }
}
