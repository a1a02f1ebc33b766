//! TypeScript algebra for code generation.
//!
//! The schema compiler and client assembler build values of these
//! types; rendering to text is the job of the `Emit` trait in
//! `emit.rs`. Keeping schema translation and target syntax apart is
//! what makes the compiler testable without string matching.

/// TypeScript literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Null,
}

/// TypeScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier: `Pet`
    Ident(String),
    /// Literal value: `"bar"`, `42`
    Literal(TsLiteral),
    /// Call: `callee(args)`
    Call {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Method call on a receiver: `recv.name(args)` — the chain link
    /// every zod constraint hangs off.
    Method {
        recv: Box<TsExpr>,
        name: String,
        args: Vec<TsExpr>,
    },
    /// Member access: `object.prop`
    Member { object: Box<TsExpr>, prop: String },
    /// Arrow function: `(a, b) => body`
    Arrow {
        params: Vec<String>,
        body: Box<TsExpr>,
    },
    /// Array literal: `[a, b]`
    Array(Vec<TsExpr>),
    /// Object literal: `{ a: 1 }`
    Object(Vec<(String, TsExpr)>),
    /// Constructor call: `new RegExp(...)`
    New {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Logical negation: `!expr`
    Not(Box<TsExpr>),
    /// Escape hatch for constructs the algebra does not model.
    Raw(String),
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        TsExpr::Literal(TsLiteral::Int(value))
    }

    pub fn num(value: f64) -> Self {
        TsExpr::Literal(TsLiteral::Number(value))
    }

    /// `self.name(args)`
    pub fn method(self, name: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Method {
            recv: Box::new(self),
            name: name.into(),
            args,
        }
    }

    /// `self.prop`
    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    /// `self(args)`
    pub fn call(self, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(self),
            args,
        }
    }
}

/// `z.name(args)` — the root of every validator chain.
pub fn zod(name: &str, args: Vec<TsExpr>) -> TsExpr {
    TsExpr::ident("z").method(name, args)
}

/// TypeScript primitive types (explicit-type mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Unknown,
}

/// TypeScript type representation (explicit-type mode).
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Primitive(TsPrimitive),
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
    /// `A & B`
    Intersection(Vec<TsType>),
    /// `{ foo: string; bar?: number }`
    Object(Vec<TsProp>),
    /// `Record<K, V>`
    Record {
        key: Box<TsType>,
        value: Box<TsType>,
    },
    /// `"foo"`, `42`, `true`
    Literal(TsLiteral),
    /// Named type reference
    Ref(String),
}

/// Object property in a type position.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// Function/method/constructor parameter.
#[derive(Debug, Clone)]
pub struct TsParam {
    pub name: String,
    pub ty: Option<TsType>,
    pub optional: bool,
    pub default: Option<TsExpr>,
}

impl TsParam {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        TsParam {
            name: name.into(),
            ty: Some(ty),
            optional: false,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        TsParam {
            name: name.into(),
            ty: Some(ty),
            optional: true,
            default: None,
        }
    }
}

/// Statement in a function or method body.
#[derive(Debug, Clone)]
pub enum TsStmt {
    Const { name: String, init: TsExpr },
    Expr(TsExpr),
    Return(Option<TsExpr>),
    If {
        cond: TsExpr,
        then_body: Vec<TsStmt>,
    },
    Raw(String),
}

/// Standalone function declaration.
#[derive(Debug, Clone)]
pub struct TsFunction {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub is_async: bool,
    pub is_export: bool,
}

/// Member visibility inside a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// Class field.
#[derive(Debug, Clone)]
pub struct TsField {
    pub name: String,
    pub ty: TsType,
    pub visibility: Visibility,
}

/// Class method.
#[derive(Debug, Clone)]
pub struct TsMethod {
    pub name: String,
    /// One-line doc comment above the method.
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub is_async: bool,
}

/// Class constructor.
#[derive(Debug, Clone)]
pub struct TsCtor {
    pub params: Vec<TsParam>,
    pub body: Vec<TsStmt>,
}

/// Class declaration.
#[derive(Debug, Clone)]
pub struct TsClass {
    pub name: String,
    pub is_export: bool,
    pub fields: Vec<TsField>,
    pub ctor: Option<TsCtor>,
    pub methods: Vec<TsMethod>,
}

/// Top-level module item, emitted in order.
#[derive(Debug, Clone)]
pub enum TsDecl {
    /// Line comment block (the header banner).
    Comment(Vec<String>),
    /// `import { items } from "from";`
    Import { items: Vec<String>, from: String },
    /// `const name[: ty] = init;`
    Const {
        name: String,
        ty: Option<TsType>,
        init: TsExpr,
        is_export: bool,
    },
    /// `type Name = ...;`
    TypeAlias {
        name: String,
        ty: TsType,
        is_export: bool,
    },
    /// `interface Name { ... }`
    Interface {
        name: String,
        props: Vec<TsProp>,
        is_export: bool,
    },
    Function(TsFunction),
    Class(TsClass),
    /// Verbatim block (the ApiError class).
    Raw(String),
}

/// A complete output module.
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    pub decls: Vec<TsDecl>,
}
