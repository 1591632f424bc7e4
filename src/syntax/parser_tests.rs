use super::*;
use crate::syntax::parse_source;
use std::path::Path;

fn parse(source: &str) -> File {
    parse_source(source, Path::new("demo.vo")).expect("parse failed")
}

#[test]
fn test_parse_empty_package() {
    let file = parse("package demo\n");
    assert_eq!(file.package, "demo");
    assert!(file.decls.is_empty());
}

#[test]
fn test_parse_imports() {
    let file = parse(
        r#"package demo

import "other"

import (
	"one"
	alias "two/three"
)
"#,
    );
    assert_eq!(file.imports.len(), 3);
    assert_eq!(file.imports[0].local_name(), "other");
    assert_eq!(file.imports[2].local_name(), "alias");
    assert_eq!(file.imports[2].path, "two/three");
}

#[test]
fn test_parse_struct_and_methods() {
    let file = parse(
        r#"package demo

type Error struct {
	TheCode string
}

func (e *Error) Code() string { return e.TheCode }
func (e *Error) Error() string { return e.TheCode }
"#,
    );
    assert_eq!(file.decls.len(), 3);

    let Decl::Type(ty) = &file.decls[0] else {
        panic!("expected type declaration");
    };
    assert_eq!(ty.name, "Error");
    let TypeBody::Struct(st) = &ty.body else {
        panic!("expected struct body");
    };
    assert_eq!(st.fields.len(), 1);
    assert_eq!(st.fields[0].names[0].name, "TheCode");

    let Decl::Func(code) = &file.decls[1] else {
        panic!("expected func declaration");
    };
    assert!(code.is_method());
    let recv = code.recv.as_ref().unwrap();
    assert!(recv.is_pointer);
    assert_eq!(recv.type_name, "Error");
    assert_eq!(recv.name.as_ref().unwrap().name, "e");
}

#[test]
fn test_parse_doc_comment_attachment() {
    let file = parse(
        r#"package demo

// Hello is a demo function.
//
// Errors:
//
//    - hello-error -- is always returned
func Hello() error {
	return nil
}

func NoDoc() error { return nil }
"#,
    );
    let Decl::Func(hello) = &file.decls[0] else {
        panic!("expected func");
    };
    let doc = hello.doc.as_ref().expect("doc comment");
    assert!(doc.starts_with("Hello is a demo function.\n"));
    assert!(doc.contains("Errors:\n"));
    assert!(doc.contains("   - hello-error -- is always returned\n"));

    let Decl::Func(no_doc) = &file.decls[1] else {
        panic!("expected func");
    };
    assert!(no_doc.doc.is_none());
}

#[test]
fn test_blank_line_detaches_doc() {
    let file = parse(
        r#"package demo

// A stray comment.

func F() error { return nil }
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    assert!(f.doc.is_none());
}

#[test]
fn test_parse_named_results_and_bare_return() {
    let file = parse(
        r#"package demo

func F() (n int, err error) {
	return
}
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    assert_eq!(f.results.len(), 2);
    assert_eq!(f.results[1].names[0].name, "err");
    assert!(f.results_span.is_some());
    let Stmt::Return { results, .. } = &f.body.stmts[0] else {
        panic!("expected return");
    };
    assert!(results.is_empty());
}

#[test]
fn test_parse_unnamed_result_types() {
    let file = parse(
        r#"package demo

func F() (int, error) {
	return 1, nil
}
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    assert_eq!(f.results.len(), 2);
    assert!(f.results[0].names.is_empty());
    assert!(f.results[1].names.is_empty());
}

#[test]
fn test_parse_composite_literals() {
    let file = parse(
        r#"package demo

func F() error {
	return &Error{TheCode: "some-error"}
}

func G() error {
	return &Error{"other-error"}
}
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    let Stmt::Return { results, .. } = &f.body.stmts[0] else {
        panic!("expected return");
    };
    let Expr::Unary { op, expr, .. } = &results[0] else {
        panic!("expected unary expression");
    };
    assert_eq!(*op, UnaryOp::Ref);
    let Expr::Composite { elems, .. } = expr.as_ref() else {
        panic!("expected composite literal");
    };
    assert_eq!(elems[0].key.as_ref().unwrap().name, "TheCode");
}

#[test]
fn test_no_composite_literal_in_if_header() {
    let file = parse(
        r#"package demo

func F() error {
	if false {
		return &Error{"dead-error"}
	}
	return nil
}
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    assert!(matches!(f.body.stmts[0], Stmt::If { .. }));
}

#[test]
fn test_parse_assignments_and_destructuring() {
    let file = parse(
        r#"package demo

func F() error {
	var err error
	err = helper()
	x, err := destructured()
	x = x
	return err
}
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    assert!(matches!(f.body.stmts[0], Stmt::Var(_)));
    let Stmt::Assign {
        lhs, rhs, define, ..
    } = &f.body.stmts[2]
    else {
        panic!("expected assignment");
    };
    assert!(define);
    assert_eq!(lhs.len(), 2);
    assert_eq!(rhs.len(), 1);
}

#[test]
fn test_parse_func_literal() {
    let file = parse(
        r#"package demo

func F() error {
	var err error
	helper := func() {
		err = boom()
	}
	helper()
	return err
}
"#,
    );
    let Decl::Func(f) = &file.decls[0] else {
        panic!("expected func");
    };
    let Stmt::Assign { rhs, .. } = &f.body.stmts[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(rhs[0], Expr::FuncLit { .. }));
}

#[test]
fn test_parse_interface_decl() {
    let file = parse(
        r#"package demo

type Failer interface {
	Fail() error
}
"#,
    );
    let Decl::Type(ty) = &file.decls[0] else {
        panic!("expected type");
    };
    let TypeBody::Interface(iface) = &ty.body else {
        panic!("expected interface body");
    };
    assert_eq!(iface.methods.len(), 1);
    assert_eq!(iface.methods[0].name, "Fail");
}

#[test]
fn test_parse_const_group() {
    let file = parse(
        r#"package demo

const (
	codeBoom = "boom-error"
	codeBust = "bust-error"
)
"#,
    );
    assert_eq!(file.decls.len(), 2);
    let Decl::Const(c) = &file.decls[0] else {
        panic!("expected const");
    };
    assert_eq!(c.name, "codeBoom");
}

#[test]
fn test_parse_error_reports_diagnostic() {
    let result = parse_source("package demo\n\nfunc F( {}\n", Path::new("demo.vo"));
    let bag = result.expect_err("expected parse failure");
    assert!(bag.has_errors());
    assert_eq!(bag.diagnostics()[0].code, "V0001");
}

#[test]
fn test_invalid_input_reports_diagnostic() {
    let result = parse_source("package demo\n\n@\n", Path::new("demo.vo"));
    let bag = result.expect_err("expected lex failure");
    assert!(bag.diagnostics().iter().any(|d| d.code == "V0002"));
}
