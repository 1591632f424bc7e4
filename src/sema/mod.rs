//! Semantic services for one Vo package
//!
//! Resolves identifiers to their declarations, computes method sets,
//! classifies expression types, and evaluates compile-time string
//! constants. The analysis layers consume these services through
//! `PackageInfo`; they never walk declaration scopes themselves.

use crate::diagnostics::Span;
use crate::syntax::ast::*;
use std::collections::HashMap;

/// Index of an object in a package's object table
pub type ObjId = usize;

/// Index of a named type in a package's type table
pub type TypeId = usize;

/// What kind of declaration an object refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    /// Local variable declared in a function body
    Local,
    /// Function parameter
    Param,
    /// Method receiver
    Receiver,
    /// Named result variable
    NamedResult,
    /// Package-level variable
    Global,
    /// Package-level string constant
    Const,
    /// Top-level function or method
    Func,
    /// Named type
    TypeName,
    /// Imported package
    Package,
    /// `nil`, `true`, or `false`
    Predeclared,
}

/// A declared entity
#[derive(Debug, Clone)]
pub struct Object<'a> {
    pub name: String,
    pub kind: ObjKind,
    /// Span of the declaring identifier
    pub decl_span: Span,
    /// Declaration node for `Func` objects
    pub func: Option<NodeId>,
    /// Type table entry for `TypeName` objects
    pub type_id: Option<TypeId>,
    /// Imported package name for `Package` objects
    pub package_name: Option<String>,
    /// Declared type, when the declaration wrote one
    pub decl_ty: Option<&'a TypeExpr>,
    /// Initializer for type inference: the expression, and the result
    /// position when the object was bound by a destructuring assignment
    pub init: Option<(&'a Expr, Option<usize>)>,
    /// Receiver type (name, is_pointer) for `Receiver` objects
    pub recv_type: Option<(String, bool)>,
    /// Value expression for `Const` objects
    pub const_expr: Option<&'a Expr>,
}

impl<'a> Object<'a> {
    fn new(name: impl Into<String>, kind: ObjKind, decl_span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            decl_span,
            func: None,
            type_id: None,
            package_name: None,
            decl_ty: None,
            init: None,
            recv_type: None,
            const_expr: None,
        }
    }
}

/// A named type declared in the package
#[derive(Debug, Clone)]
pub struct NamedTypeInfo<'a> {
    pub name: String,
    pub decl: &'a TypeDecl,
}

/// A method declared in the package
#[derive(Debug, Clone)]
pub struct MethodInfo<'a> {
    pub name: String,
    pub pointer_recv: bool,
    pub decl: &'a FuncDecl,
}

/// The type of an expression, as far as the analyzer needs to know it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Invalid,
    /// The untyped `nil`
    Nil,
    Bool,
    Int,
    Str,
    /// The built-in `error` interface
    ErrorIface,
    /// A named type declared in this package
    Named(TypeId),
    /// Pointer type
    Pointer(Box<Type>),
    /// A type imported from another package; only facts describe it
    Foreign { package: String, name: String },
}

impl Type {
    /// Unwrap one level of pointer
    pub fn deref(&self) -> &Type {
        match self {
            Type::Pointer(elem) => elem,
            other => other,
        }
    }
}

/// Resolved semantic information for one package
pub struct PackageInfo<'a> {
    pub package: String,
    objects: Vec<Object<'a>>,
    uses: HashMap<NodeId, ObjId>,
    types: Vec<NamedTypeInfo<'a>>,
    type_ids: HashMap<String, TypeId>,
    funcs: HashMap<NodeId, &'a FuncDecl>,
    methods: HashMap<String, Vec<MethodInfo<'a>>>,
    imports: HashMap<String, String>,
}

impl<'a> PackageInfo<'a> {
    /// Resolve all files of one package
    pub fn resolve(files: &'a [File]) -> PackageInfo<'a> {
        let package = files
            .first()
            .map(|f| f.package.clone())
            .unwrap_or_default();
        let mut info = PackageInfo {
            package,
            objects: Vec::new(),
            uses: HashMap::new(),
            types: Vec::new(),
            type_ids: HashMap::new(),
            funcs: HashMap::new(),
            methods: HashMap::new(),
            imports: HashMap::new(),
        };

        {
            let mut resolver = Resolver {
                info: &mut info,
                package_scope: HashMap::new(),
                scopes: Vec::new(),
            };
            resolver.collect_package_scope(files);
            resolver.resolve_bodies(files);
        }
        info
    }

    /// The object an identifier occurrence resolves to
    pub fn object_of(&self, ident_id: NodeId) -> Option<&Object<'a>> {
        self.uses.get(&ident_id).map(|&id| &self.objects[id])
    }

    /// The object id an identifier occurrence resolves to
    pub fn obj_id_of(&self, ident_id: NodeId) -> Option<ObjId> {
        self.uses.get(&ident_id).copied()
    }

    /// Access an object by id
    pub fn object(&self, id: ObjId) -> &Object<'a> {
        &self.objects[id]
    }

    /// Look up a named type by name
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.type_ids.get(name).copied()
    }

    /// Access a named type entry
    pub fn named_type(&self, id: TypeId) -> &NamedTypeInfo<'a> {
        &self.types[id]
    }

    /// All named types, in declaration order
    pub fn named_types(&self) -> impl Iterator<Item = (TypeId, &NamedTypeInfo<'a>)> {
        self.types.iter().enumerate()
    }

    /// The function declaration behind a `Func` object
    pub fn func_decl(&self, id: NodeId) -> Option<&'a FuncDecl> {
        self.funcs.get(&id).copied()
    }

    /// All methods declared on the named type
    pub fn methods_of(&self, type_name: &str) -> &[MethodInfo<'a>] {
        self.methods.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The package an import's local name refers to
    pub fn import_package(&self, local: &str) -> Option<&str> {
        self.imports.get(local).map(String::as_str)
    }

    /// Resolve a written type expression to a semantic type
    pub fn type_expr_type(&self, te: &TypeExpr) -> Type {
        match te {
            TypeExpr::Pointer { elem, .. } => {
                Type::Pointer(Box::new(self.type_expr_type(elem)))
            }
            TypeExpr::Name { package: Some(p), name, .. } => Type::Foreign {
                package: self
                    .import_package(p)
                    .unwrap_or(p.as_str())
                    .to_string(),
                name: name.clone(),
            },
            TypeExpr::Name { package: None, name, .. } => match name.as_str() {
                "string" => Type::Str,
                "int" => Type::Int,
                "bool" => Type::Bool,
                "error" => Type::ErrorIface,
                _ => match self.lookup_type(name) {
                    Some(id) => Type::Named(id),
                    None => Type::Invalid,
                },
            },
        }
    }

    /// The type of an expression
    pub fn type_of(&self, expr: &Expr) -> Type {
        self.type_of_guarded(expr, &mut Vec::new())
    }

    fn type_of_guarded(&self, expr: &Expr, visiting: &mut Vec<ObjId>) -> Type {
        match expr {
            Expr::StringLit { .. } => Type::Str,
            Expr::IntLit { .. } => Type::Int,
            Expr::Binary { .. } => Type::Bool,
            Expr::Unary { op, expr, .. } => match op {
                UnaryOp::Ref => {
                    Type::Pointer(Box::new(self.type_of_guarded(expr, visiting)))
                }
                UnaryOp::Not => Type::Bool,
            },
            Expr::Composite { ty, .. } => self.type_expr_type(ty),
            Expr::FuncLit { .. } => Type::Invalid,
            Expr::Ident(ident) => self.type_of_ident(ident, visiting),
            Expr::Selector { expr, name, .. } => {
                self.type_of_selection(expr, name, visiting)
            }
            Expr::Call { callee, .. } => self.type_of_call(callee, visiting),
        }
    }

    fn type_of_ident(&self, ident: &Ident, visiting: &mut Vec<ObjId>) -> Type {
        let Some(obj_id) = self.obj_id_of(ident.id) else {
            return Type::Invalid;
        };
        if visiting.contains(&obj_id) {
            return Type::Invalid;
        }
        let obj = &self.objects[obj_id];
        match obj.kind {
            ObjKind::Predeclared => match obj.name.as_str() {
                "nil" => Type::Nil,
                "true" | "false" => Type::Bool,
                _ => Type::Invalid,
            },
            ObjKind::Const => Type::Str,
            ObjKind::Receiver => match &obj.recv_type {
                Some((name, is_pointer)) => {
                    let base = match self.lookup_type(name) {
                        Some(id) => Type::Named(id),
                        None => Type::Invalid,
                    };
                    if *is_pointer {
                        Type::Pointer(Box::new(base))
                    } else {
                        base
                    }
                }
                None => Type::Invalid,
            },
            ObjKind::Local
            | ObjKind::Param
            | ObjKind::NamedResult
            | ObjKind::Global => {
                if let Some(ty) = obj.decl_ty {
                    return self.type_expr_type(ty);
                }
                let Some((init, index)) = obj.init else {
                    return Type::Invalid;
                };
                visiting.push(obj_id);
                let ty = match index {
                    None => self.type_of_guarded(init, visiting),
                    Some(i) => self.type_of_result(init, i, visiting),
                };
                visiting.pop();
                ty
            }
            ObjKind::Func | ObjKind::TypeName | ObjKind::Package => Type::Invalid,
        }
    }

    /// The type of result `index` of a multi-value call
    fn type_of_result(&self, call: &Expr, index: usize, visiting: &mut Vec<ObjId>) -> Type {
        let Expr::Call { callee, .. } = call else {
            return Type::Invalid;
        };
        let Some(decl) = self.callee_decl(callee, visiting) else {
            return Type::Invalid;
        };
        let mut position = 0usize;
        for result in &decl.results {
            let names = result.names.len().max(1);
            if index < position + names {
                return self.type_expr_type(&result.ty);
            }
            position += names;
        }
        Type::Invalid
    }

    fn type_of_call(&self, callee: &Expr, visiting: &mut Vec<ObjId>) -> Type {
        // A conversion: the "callee" names a type.
        if let Expr::Ident(ident) = callee {
            if let Some(obj) = self.object_of(ident.id) {
                if obj.kind == ObjKind::TypeName {
                    return match obj.type_id {
                        Some(id) => Type::Named(id),
                        None => Type::Invalid,
                    };
                }
            }
        }

        match self.callee_decl(callee, visiting) {
            Some(decl) => match decl.results.last() {
                Some(result) => self.type_expr_type(&result.ty),
                None => Type::Invalid,
            },
            None => Type::Invalid,
        }
    }

    /// Resolve the function declaration a call expression targets, for
    /// local functions and local method calls.
    fn callee_decl(&self, callee: &Expr, visiting: &mut Vec<ObjId>) -> Option<&'a FuncDecl> {
        match callee {
            Expr::Ident(ident) => {
                let obj = self.object_of(ident.id)?;
                match obj.kind {
                    ObjKind::Func => self.func_decl(obj.func?),
                    _ => None,
                }
            }
            Expr::Selector { expr, name, .. } => {
                // Package-qualified calls have no local declaration.
                if let Expr::Ident(ident) = expr.as_ref() {
                    if let Some(obj) = self.object_of(ident.id) {
                        if obj.kind == ObjKind::Package {
                            return None;
                        }
                    }
                }
                let recv = self.type_of_guarded(expr, visiting);
                self.method(&recv, name)
            }
            _ => None,
        }
    }

    fn type_of_selection(&self, base: &Expr, name: &str, visiting: &mut Vec<ObjId>) -> Type {
        // Package member selection is opaque without facts.
        if let Expr::Ident(ident) = base {
            if let Some(obj) = self.object_of(ident.id) {
                if obj.kind == ObjKind::Package {
                    return Type::Invalid;
                }
            }
        }

        let base_ty = self.type_of_guarded(base, visiting);
        let Type::Named(id) = base_ty.deref() else {
            return Type::Invalid;
        };
        let TypeBody::Struct(st) = &self.types[*id].decl.body else {
            return Type::Invalid;
        };
        for field in &st.fields {
            for field_name in &field.names {
                if field_name.name == name {
                    return self.type_expr_type(&field.ty);
                }
            }
        }
        Type::Invalid
    }

    /// Find the method `name` on receiver type `recv`, trying the value
    /// method set first and the pointer method set if `recv` is not
    /// already a pointer.
    pub fn method(&self, recv: &Type, name: &str) -> Option<&'a FuncDecl> {
        match recv {
            Type::Named(id) => {
                let type_name = &self.types[*id].name;
                self.method_in_set(type_name, name, false)
                    .or_else(|| self.method_in_set(type_name, name, true))
            }
            Type::Pointer(elem) => match elem.as_ref() {
                Type::Named(id) => {
                    let type_name = &self.types[*id].name;
                    self.method_in_set(type_name, name, true)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn method_in_set(&self, type_name: &str, name: &str, pointer: bool) -> Option<&'a FuncDecl> {
        self.methods_of(type_name)
            .iter()
            .find(|m| m.name == name && (pointer || !m.pointer_recv))
            .map(|m| m.decl)
    }

    // Capability checks

    /// Whether `ty` satisfies the `error` capability (`Error() string`)
    pub fn implements_error(&self, ty: &Type) -> bool {
        self.has_string_getter(ty, "Error")
    }

    /// Whether `ty` satisfies the coded-error capability
    /// (`Error() string` and `Code() string`)
    pub fn implements_coded_error(&self, ty: &Type) -> bool {
        self.has_string_getter(ty, "Error") && self.has_string_getter(ty, "Code")
    }

    /// Whether `ty` satisfies the coded-error-with-cause capability
    pub fn implements_coded_error_with_cause(&self, ty: &Type) -> bool {
        self.implements_coded_error(ty) && self.has_error_getter(ty, "Cause")
    }

    fn has_string_getter(&self, ty: &Type, name: &str) -> bool {
        match ty {
            Type::ErrorIface => name == "Error",
            Type::Named(id) => match &self.types[*id].decl.body {
                TypeBody::Interface(iface) => iface
                    .methods
                    .iter()
                    .any(|m| m.name == name && sig_is_string_getter(&m.params, &m.results)),
                _ => self
                    .method_in_set(&self.types[*id].name, name, false)
                    .is_some_and(|m| sig_is_string_getter(&m.params, &m.results)),
            },
            Type::Pointer(elem) => match elem.as_ref() {
                Type::Named(id) => self
                    .method_in_set(&self.types[*id].name, name, true)
                    .is_some_and(|m| sig_is_string_getter(&m.params, &m.results)),
                Type::ErrorIface => name == "Error",
                _ => false,
            },
            _ => false,
        }
    }

    fn has_error_getter(&self, ty: &Type, name: &str) -> bool {
        match ty {
            Type::Named(id) => match &self.types[*id].decl.body {
                TypeBody::Interface(iface) => iface
                    .methods
                    .iter()
                    .any(|m| m.name == name && sig_returns_error(&m.params, &m.results)),
                _ => self
                    .method_in_set(&self.types[*id].name, name, false)
                    .is_some_and(|m| sig_returns_error(&m.params, &m.results)),
            },
            Type::Pointer(elem) => match elem.as_ref() {
                Type::Named(id) => self
                    .method_in_set(&self.types[*id].name, name, true)
                    .is_some_and(|m| sig_returns_error(&m.params, &m.results)),
                _ => false,
            },
            _ => false,
        }
    }

    // Constant evaluation

    /// The compile-time string value of an expression, if it has one
    pub fn const_string_value(&self, expr: &Expr) -> Option<String> {
        self.const_string_guarded(expr, &mut Vec::new())
    }

    fn const_string_guarded(&self, expr: &Expr, visiting: &mut Vec<ObjId>) -> Option<String> {
        match expr {
            Expr::StringLit { value, .. } => Some(value.clone()),
            Expr::Ident(ident) => {
                let obj_id = self.obj_id_of(ident.id)?;
                if visiting.contains(&obj_id) {
                    return None;
                }
                let obj = &self.objects[obj_id];
                if obj.kind != ObjKind::Const {
                    return None;
                }
                let value = obj.const_expr?;
                visiting.push(obj_id);
                let result = self.const_string_guarded(value, visiting);
                visiting.pop();
                result
            }
            _ => None,
        }
    }
}

fn type_expr_is(te: &TypeExpr, expected: &str) -> bool {
    matches!(te, TypeExpr::Name { package: None, name, .. } if name == expected)
}

fn sig_is_string_getter(params: &[ParamDecl], results: &[ResultDecl]) -> bool {
    params.is_empty() && results.len() == 1 && type_expr_is(&results[0].ty, "string")
}

fn sig_returns_error(params: &[ParamDecl], results: &[ResultDecl]) -> bool {
    params.is_empty() && results.len() == 1 && type_expr_is(&results[0].ty, "error")
}

// Resolution

struct Resolver<'a, 'b> {
    info: &'b mut PackageInfo<'a>,
    package_scope: HashMap<String, ObjId>,
    scopes: Vec<HashMap<String, ObjId>>,
}

impl<'a, 'b> Resolver<'a, 'b> {
    fn collect_package_scope(&mut self, files: &'a [File]) {
        for name in ["nil", "true", "false"] {
            let obj = Object::new(name, ObjKind::Predeclared, Span::file(""));
            let id = self.push_object(obj);
            self.package_scope.insert(name.to_string(), id);
        }

        for file in files {
            for import in &file.imports {
                let local = import.local_name().to_string();
                let target = import
                    .path
                    .rsplit('/')
                    .next()
                    .unwrap_or(&import.path)
                    .to_string();
                self.info.imports.insert(local.clone(), target.clone());
                let mut obj = Object::new(local.clone(), ObjKind::Package, import.span.clone());
                obj.package_name = Some(target);
                let id = self.push_object(obj);
                self.package_scope.insert(local, id);
            }

            for decl in &file.decls {
                match decl {
                    Decl::Type(ty) => {
                        let type_id = self.info.types.len();
                        self.info.types.push(NamedTypeInfo {
                            name: ty.name.clone(),
                            decl: ty,
                        });
                        self.info.type_ids.insert(ty.name.clone(), type_id);
                        let mut obj =
                            Object::new(ty.name.clone(), ObjKind::TypeName, ty.name_span.clone());
                        obj.type_id = Some(type_id);
                        let id = self.push_object(obj);
                        self.package_scope.insert(ty.name.clone(), id);
                    }
                    Decl::Func(func) => {
                        self.info.funcs.insert(func.id, func);
                        match &func.recv {
                            Some(recv) => {
                                self.info
                                    .methods
                                    .entry(recv.type_name.clone())
                                    .or_default()
                                    .push(MethodInfo {
                                        name: func.name.clone(),
                                        pointer_recv: recv.is_pointer,
                                        decl: func,
                                    });
                            }
                            None => {
                                let mut obj = Object::new(
                                    func.name.clone(),
                                    ObjKind::Func,
                                    func.name_span.clone(),
                                );
                                obj.func = Some(func.id);
                                let id = self.push_object(obj);
                                self.package_scope.insert(func.name.clone(), id);
                            }
                        }
                    }
                    Decl::Const(c) => {
                        let mut obj =
                            Object::new(c.name.clone(), ObjKind::Const, c.name_span.clone());
                        obj.const_expr = Some(&c.value);
                        let id = self.push_object(obj);
                        self.package_scope.insert(c.name.clone(), id);
                    }
                    Decl::Var(var) => {
                        for (i, name) in var.names.iter().enumerate() {
                            let mut obj =
                                Object::new(name.name.clone(), ObjKind::Global, name.span.clone());
                            obj.decl_ty = var.ty.as_ref();
                            if obj.decl_ty.is_none() {
                                if var.values.len() == var.names.len() {
                                    obj.init = Some((&var.values[i], None));
                                } else if var.values.len() == 1 {
                                    obj.init = Some((&var.values[0], Some(i)));
                                }
                            }
                            let id = self.push_object(obj);
                            self.package_scope.insert(name.name.clone(), id);
                            self.record_use(name.id, id);
                        }
                    }
                }
            }
        }
    }

    fn resolve_bodies(&mut self, files: &'a [File]) {
        for file in files {
            for decl in &file.decls {
                match decl {
                    Decl::Func(func) => self.resolve_func(func),
                    Decl::Const(c) => self.resolve_expr(&c.value),
                    Decl::Var(var) => {
                        for value in &var.values {
                            self.resolve_expr(value);
                        }
                    }
                    Decl::Type(_) => {}
                }
            }
        }
    }

    fn resolve_func(&mut self, func: &'a FuncDecl) {
        self.scopes.push(HashMap::new());

        if let Some(recv) = &func.recv {
            if let Some(name) = &recv.name {
                let mut obj =
                    Object::new(name.name.clone(), ObjKind::Receiver, name.span.clone());
                obj.recv_type = Some((recv.type_name.clone(), recv.is_pointer));
                let id = self.push_object(obj);
                self.declare(name.name.clone(), id);
                self.record_use(name.id, id);
            }
        }

        for param in &func.params {
            for name in &param.names {
                let mut obj = Object::new(name.name.clone(), ObjKind::Param, name.span.clone());
                obj.decl_ty = Some(&param.ty);
                let id = self.push_object(obj);
                self.declare(name.name.clone(), id);
                self.record_use(name.id, id);
            }
        }

        for result in &func.results {
            for name in &result.names {
                let mut obj =
                    Object::new(name.name.clone(), ObjKind::NamedResult, name.span.clone());
                obj.decl_ty = Some(&result.ty);
                let id = self.push_object(obj);
                self.declare(name.name.clone(), id);
                self.record_use(name.id, id);
            }
        }

        self.resolve_block(&func.body);
        self.scopes.pop();
    }

    fn resolve_block(&mut self, block: &'a Block) {
        self.scopes.push(HashMap::new());
        for stmt in &block.stmts {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn resolve_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Var(var) => {
                for value in &var.values {
                    self.resolve_expr(value);
                }
                for (i, name) in var.names.iter().enumerate() {
                    let mut obj =
                        Object::new(name.name.clone(), ObjKind::Local, name.span.clone());
                    obj.decl_ty = var.ty.as_ref();
                    if obj.decl_ty.is_none() {
                        if var.values.len() == var.names.len() {
                            obj.init = Some((&var.values[i], None));
                        } else if var.values.len() == 1 {
                            obj.init = Some((&var.values[0], Some(i)));
                        }
                    }
                    let id = self.push_object(obj);
                    self.declare(name.name.clone(), id);
                    self.record_use(name.id, id);
                }
            }
            Stmt::Assign {
                lhs, rhs, define, ..
            } => {
                for value in rhs {
                    self.resolve_expr(value);
                }
                for (i, target) in lhs.iter().enumerate() {
                    match target {
                        Expr::Ident(ident) if *define => {
                            // Short declarations bind a fresh object unless
                            // the name is already declared in this block.
                            match self.lookup_current_scope(&ident.name) {
                                Some(existing) => self.record_use(ident.id, existing),
                                None => {
                                    let mut obj = Object::new(
                                        ident.name.clone(),
                                        ObjKind::Local,
                                        ident.span.clone(),
                                    );
                                    if rhs.len() == lhs.len() {
                                        obj.init = Some((&rhs[i], None));
                                    } else if rhs.len() == 1 {
                                        obj.init = Some((&rhs[0], Some(i)));
                                    }
                                    let id = self.push_object(obj);
                                    self.declare(ident.name.clone(), id);
                                    self.record_use(ident.id, id);
                                }
                            }
                        }
                        other => self.resolve_expr(other),
                    }
                }
            }
            Stmt::Return { results, .. } => {
                for result in results {
                    self.resolve_expr(result);
                }
            }
            Stmt::If {
                cond,
                then_block,
                else_branch,
                ..
            } => {
                self.resolve_expr(cond);
                self.resolve_block(then_block);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Expr { expr, .. } => self.resolve_expr(expr),
            Stmt::Block(block) => self.resolve_block(block),
        }
    }

    fn resolve_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Ident(ident) => {
                if let Some(id) = self.lookup(&ident.name) {
                    self.record_use(ident.id, id);
                }
            }
            Expr::StringLit { .. } | Expr::IntLit { .. } => {}
            Expr::Selector { expr, .. } => self.resolve_expr(expr),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Composite { elems, .. } => {
                // Keys are field names, not variable uses.
                for elem in elems {
                    self.resolve_expr(&elem.value);
                }
            }
            Expr::Unary { expr, .. } => self.resolve_expr(expr),
            Expr::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
            }
            Expr::FuncLit {
                params,
                results,
                body,
                ..
            } => {
                self.scopes.push(HashMap::new());
                for param in params {
                    for name in &param.names {
                        let mut obj =
                            Object::new(name.name.clone(), ObjKind::Local, name.span.clone());
                        obj.decl_ty = Some(&param.ty);
                        let id = self.push_object(obj);
                        self.declare(name.name.clone(), id);
                        self.record_use(name.id, id);
                    }
                }
                for result in results {
                    for name in &result.names {
                        let mut obj =
                            Object::new(name.name.clone(), ObjKind::Local, name.span.clone());
                        obj.decl_ty = Some(&result.ty);
                        let id = self.push_object(obj);
                        self.declare(name.name.clone(), id);
                        self.record_use(name.id, id);
                    }
                }
                self.resolve_block(body);
                self.scopes.pop();
            }
        }
    }

    fn push_object(&mut self, obj: Object<'a>) -> ObjId {
        let id = self.info.objects.len();
        self.info.objects.push(obj);
        id
    }

    fn declare(&mut self, name: String, id: ObjId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, id);
        } else {
            self.package_scope.insert(name, id);
        }
    }

    fn lookup(&self, name: &str) -> Option<ObjId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.get(name) {
                return Some(id);
            }
        }
        self.package_scope.get(name).copied()
    }

    fn lookup_current_scope(&self, name: &str) -> Option<ObjId> {
        self.scopes.last().and_then(|s| s.get(name).copied())
    }

    fn record_use(&mut self, ident_id: NodeId, obj: ObjId) {
        self.info.uses.insert(ident_id, obj);
    }
}
