//! Abstract syntax tree for Vo source files
//!
//! Every node carries a unique id and a source span. Node ids are how the
//! analysis layers refer to expressions and declarations without holding
//! references into the tree.

use crate::diagnostics::Span;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for AST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Generate a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed Vo source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: NodeId,
    pub span: Span,
    pub package: String,
    pub package_span: Span,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
}

/// Import declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    pub id: NodeId,
    pub span: Span,
    /// Local name, when the import is aliased
    pub alias: Option<String>,
    /// Import path as written
    pub path: String,
}

impl ImportDecl {
    /// The name the package is referred to by in this file
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// Top-level declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
    Const(ConstDecl),
    Var(VarDecl),
}

/// Named type declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: NodeId,
    pub span: Span,
    pub doc: Option<String>,
    pub name: String,
    pub name_span: Span,
    pub body: TypeBody,
}

/// The underlying shape of a named type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeBody {
    Struct(StructType),
    Interface(InterfaceType),
    /// Named type over another type (e.g. `type StringError string`)
    Named(TypeExpr),
}

/// A struct type literal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructType {
    pub id: NodeId,
    pub span: Span,
    pub fields: Vec<FieldDecl>,
}

/// One field declaration line; `names` is empty for embedded fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// An interface type literal (method signatures only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceType {
    pub id: NodeId,
    pub span: Span,
    pub methods: Vec<MethodSig>,
}

/// A method signature inside an interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSig {
    pub id: NodeId,
    pub span: Span,
    pub doc: Option<String>,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub results: Vec<ResultDecl>,
}

/// Function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: NodeId,
    pub span: Span,
    pub doc: Option<String>,
    pub recv: Option<Receiver>,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<ParamDecl>,
    pub results: Vec<ResultDecl>,
    /// Span of the whole result list, when there is one
    pub results_span: Option<Span>,
    pub body: Block,
}

impl FuncDecl {
    /// Whether this declaration is a method (has a receiver)
    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }

    /// Whether the name is exported (starts with an upper-case letter)
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_uppercase())
    }
}

/// Method receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    pub id: NodeId,
    pub span: Span,
    pub name: Option<Ident>,
    pub is_pointer: bool,
    pub type_name: String,
}

/// Function parameter group (one type, possibly several names)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
}

/// Function result group (named results carry identifiers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDecl {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
}

/// Package-level string constant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub name_span: Span,
    pub value: Expr,
}

/// Variable declaration (package-level or statement)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
}

/// An identifier occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
}

/// Type expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeExpr {
    /// Possibly package-qualified type name
    Name {
        id: NodeId,
        span: Span,
        package: Option<String>,
        name: String,
    },
    /// Pointer type `*T`
    Pointer {
        id: NodeId,
        span: Span,
        elem: Box<TypeExpr>,
    },
}

impl TypeExpr {
    pub fn span(&self) -> &Span {
        match self {
            TypeExpr::Name { span, .. } | TypeExpr::Pointer { span, .. } => span,
        }
    }
}

/// A block of statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    /// `var` declaration
    Var(VarDecl),
    /// Assignment or short declaration; `lhs` may destructure a
    /// multi-value call when it is longer than `rhs`
    Assign {
        id: NodeId,
        span: Span,
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
        define: bool,
    },
    /// Return statement (empty `results` with named results in the
    /// signature is a bare return)
    Return {
        id: NodeId,
        span: Span,
        results: Vec<Expr>,
    },
    /// If statement; `else_branch` is a `Stmt::Block` or nested `Stmt::If`
    If {
        id: NodeId,
        span: Span,
        cond: Box<Expr>,
        then_block: Block,
        else_branch: Option<Box<Stmt>>,
    },
    /// Expression statement
    Expr {
        id: NodeId,
        span: Span,
        expr: Box<Expr>,
    },
    /// Nested block
    Block(Block),
}

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Ident(Ident),
    StringLit {
        id: NodeId,
        span: Span,
        value: String,
    },
    IntLit {
        id: NodeId,
        span: Span,
        value: i64,
    },
    /// Selection `expr.name` (field access, method value, or package member)
    Selector {
        id: NodeId,
        span: Span,
        expr: Box<Expr>,
        name: String,
        name_span: Span,
    },
    /// Call or type conversion
    Call {
        id: NodeId,
        span: Span,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Composite literal `T{...}`
    Composite {
        id: NodeId,
        span: Span,
        ty: TypeExpr,
        elems: Vec<CompositeElem>,
    },
    /// Unary operation (`&x`, `!x`)
    Unary {
        id: NodeId,
        span: Span,
        op: UnaryOp,
        expr: Box<Expr>,
    },
    /// Binary operation; only ever inspected for its span
    Binary {
        id: NodeId,
        span: Span,
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Function literal
    FuncLit {
        id: NodeId,
        span: Span,
        params: Vec<ParamDecl>,
        results: Vec<ResultDecl>,
        body: Block,
    },
}

/// One element of a composite literal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeElem {
    pub id: NodeId,
    pub span: Span,
    pub key: Option<Ident>,
    pub value: Expr,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `&` address-of
    Ref,
    /// `!` logical not
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl Expr {
    /// Node id of this expression
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Ident(ident) => ident.id,
            Expr::StringLit { id, .. }
            | Expr::IntLit { id, .. }
            | Expr::Selector { id, .. }
            | Expr::Call { id, .. }
            | Expr::Composite { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Binary { id, .. }
            | Expr::FuncLit { id, .. } => *id,
        }
    }

    /// Source span of this expression
    pub fn span(&self) -> &Span {
        match self {
            Expr::Ident(ident) => &ident.span,
            Expr::StringLit { span, .. }
            | Expr::IntLit { span, .. }
            | Expr::Selector { span, .. }
            | Expr::Call { span, .. }
            | Expr::Composite { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::FuncLit { span, .. } => span,
        }
    }
}
