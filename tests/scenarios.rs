//! End-to-end scenarios: whole packages analyzed through the public API,
//! with facts flowing between packages the way separate runs compose.

use std::path::Path;

use vouch::analysis::facts::FactStore;
use vouch::analysis::Pass;
use vouch::diagnostics::DiagnosticBag;
use vouch::sema::PackageInfo;
use vouch::syntax::parse_source;

fn analyze_package(
    sources: &[(&str, &str)],
    facts: &mut FactStore,
) -> DiagnosticBag {
    let files: Vec<_> = sources
        .iter()
        .map(|(name, source)| parse_source(source, Path::new(name)).expect("parse failed"))
        .collect();
    let info = PackageInfo::resolve(&files);
    Pass::new(&files, &info, facts).run()
}

const INNER: &str = r#"package inner

// ExportedFunc is a demo function.
//
// Errors:
//
//    - hello-error -- is always returned
func ExportedFunc() error {
	return &Error{"hello-error"}
}

type Error struct {
	TheCode string
}

func (e *Error) Code() string { return e.TheCode }
func (e *Error) Error() string { return e.TheCode }
"#;

const OUTER: &str = r#"package outer

import "inner"

// Forward passes inner's error through.
//
// Errors:
//
//    - hello-error -- whenever inner fails
func Forward() error {
	return inner.ExportedFunc()
}
"#;

#[test]
fn facts_cross_package_boundaries_in_one_run() {
    let mut facts = FactStore::new();

    let inner_diags = analyze_package(&[("inner/inner.vo", INNER)], &mut facts);
    assert!(
        inner_diags.is_empty(),
        "inner: {:#?}",
        inner_diags.diagnostics()
    );

    let outer_diags = analyze_package(&[("outer/outer.vo", OUTER)], &mut facts);
    assert!(
        outer_diags.is_empty(),
        "outer: {:#?}",
        outer_diags.diagnostics()
    );
}

#[test]
fn facts_survive_a_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let facts_path = dir.path().join("facts.json");

    // First run: analyze the inner package and persist its facts.
    let mut facts = FactStore::new();
    let diags = analyze_package(&[("inner/inner.vo", INNER)], &mut facts);
    assert!(diags.is_empty());
    facts.save(&facts_path).unwrap();

    // Second run: a fresh store loaded from disk serves the caller.
    let mut reloaded = FactStore::load(&facts_path).unwrap();
    assert_eq!(
        reloaded.function_codes("inner", "ExportedFunc").unwrap().codes,
        vec!["hello-error"]
    );

    let outer_diags = analyze_package(&[("outer/outer.vo", OUTER)], &mut reloaded);
    assert!(
        outer_diags.is_empty(),
        "outer: {:#?}",
        outer_diags.diagnostics()
    );
}

#[test]
fn missing_facts_surface_as_opaque_boundary() {
    // Without inner's facts, the call is an opaque boundary and the
    // declared contract still gets exported for outer.
    let mut facts = FactStore::new();
    let diags = analyze_package(&[("outer/outer.vo", OUTER)], &mut facts);

    assert!(diags.diagnostics().iter().any(|d| {
        d.message
            .contains("function \"ExportedFunc\" in package \"inner\" does not declare error codes")
    }));
    assert_eq!(
        facts.function_codes("outer", "Forward").unwrap().codes,
        vec!["hello-error"]
    );
}

#[test]
fn multi_file_packages_share_one_scope() {
    let types = r#"package demo

type Error struct {
	TheCode string
}

func (e *Error) Code() string { return e.TheCode }
func (e *Error) Error() string { return e.TheCode }
"#;
    let funcs = r#"package demo

// Boom is a demo function.
//
// Errors:
//
//    - boom-error -- always
func Boom() error {
	return &Error{"boom-error"}
}
"#;
    let mut facts = FactStore::new();
    let diags = analyze_package(
        &[("demo/types.vo", types), ("demo/funcs.vo", funcs)],
        &mut facts,
    );
    assert!(diags.is_empty(), "{:#?}", diags.diagnostics());
    assert!(facts.error_type("demo", "Error").is_some());
    assert!(facts.function_codes("demo", "Boom").is_some());
}

#[test]
fn foreign_method_calls_resolve_through_facts() {
    let consumer = r#"package consumer

import "inner"

// Touch calls a method on an imported type.
//
// Errors:
//
//    - touch-error -- whenever the method fails
func Touch(v inner.Widget) error {
	return v.Touch()
}
"#;
    let mut facts = FactStore::new();
    // Simulate an earlier run of the inner package having exported the
    // method's contract.
    facts.export_function_codes(
        "inner",
        "Widget.Touch",
        vouch::analysis::facts::FunctionCodesFact {
            codes: vec!["touch-error".to_string()],
        },
    );
    // Foreign types are only as legible as their facts; the widget type
    // itself needs no fact for the call to resolve.
    let diags = analyze_package(&[("consumer/consumer.vo", consumer)], &mut facts);
    assert!(diags.is_empty(), "{:#?}", diags.diagnostics());
}
