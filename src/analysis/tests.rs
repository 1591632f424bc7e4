use super::*;
use crate::analysis::facts::FactStore;
use crate::diagnostics::DiagnosticBag;
use crate::sema::PackageInfo;
use crate::syntax::parse_source;
use std::path::Path;

fn analyze_with_store(source: &str, facts: &mut FactStore) -> DiagnosticBag {
    let file = parse_source(source, Path::new("demo.vo")).expect("parse failed");
    let files = [file];
    let info = PackageInfo::resolve(&files);
    Pass::new(&files, &info, facts).run()
}

fn analyze(source: &str) -> (DiagnosticBag, FactStore) {
    let mut facts = FactStore::new();
    let diags = analyze_with_store(source, &mut facts);
    (diags, facts)
}

fn assert_has_message(diags: &DiagnosticBag, code: &str, substring: &str) {
    assert!(
        diags
            .diagnostics()
            .iter()
            .any(|d| d.code == code && d.message.contains(substring)),
        "expected a {} diagnostic containing {:?}, got: {:#?}",
        code,
        substring,
        diags.diagnostics()
    );
}

fn assert_clean(diags: &DiagnosticBag) {
    assert!(
        diags.is_empty(),
        "expected no diagnostics, got: {:#?}",
        diags.diagnostics()
    );
}

const ERROR_TYPE: &str = r#"
type Error struct {
	TheCode string
}

func (e *Error) Code() string { return e.TheCode }
func (e *Error) Error() string { return e.TheCode }
"#;

#[test]
fn test_well_formed_leaf() {
    let source = format!(
        r#"package demo
{}
// Correct is a demo function.
//
// Errors:
//
//    - hello-error       -- is always returned
// The following error codes should not occur:
//    - hello-unreachable -- should never be returned
//
// After a blank line comments in any format may follow.
func Correct() error {{
	if false {{
		return &Error{{"hello-unreachable"}}
	}}
	return &Error{{"hello-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, facts) = analyze(&source);
    assert_clean(&diags);

    let fact = facts.function_codes("demo", "Correct").expect("fact");
    assert_eq!(fact.codes, vec!["hello-error", "hello-unreachable"]);

    let ty = facts.error_type("demo", "Error").expect("type fact");
    assert!(ty.codes.is_none());
    let field = ty.field.as_ref().expect("field");
    assert_eq!(field.name, "TheCode");
    assert_eq!(field.position, 0);
}

#[test]
fn test_mismatch_reports_missing_codes() {
    let source = format!(
        r#"package demo
{}
// Partial declares less than it returns.
//
// Errors:
//
//    - hello-error -- is always returned
func Partial() error {{
	if false {{
		return &Error{{"hello-unreachable"}}
	}}
	return &Error{{"hello-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(
        &diags,
        "V1003",
        "function \"Partial\" has a mismatch of declared and actual error codes: \
         missing codes: [hello-unreachable]",
    );
}

#[test]
fn test_mismatch_reports_unused_codes() {
    let source = format!(
        r#"package demo
{}
// Overdeclared declares more than it returns.
//
// Errors:
//
//    - hello-error -- is always returned
//    - never-error -- never actually happens
func Overdeclared() error {{
	return &Error{{"hello-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(&diags, "V1003", "unused codes: [never-error]");
}

#[test]
fn test_exported_function_without_declaration() {
    let source = r#"package demo

func InvalidNoErrors() error {
	return correctNoErrors()
}

func correctNoErrors() error {
	return nil
}
"#;
    let (diags, _) = analyze(source);
    assert_has_message(
        &diags,
        "V1002",
        "function \"InvalidNoErrors\" is exported, but does not declare any error codes",
    );
    // The unexported helper is fine.
    assert_eq!(diags.len(), 1);
}

#[test]
fn test_odd_docstring_missing_blank_line() {
    let source = format!(
        r#"package demo
{}
// Two is a test function.
//
// Errors:
//    - hello-error -- is always returned.
func Two() error {{
	return &Error{{"hello-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, facts) = analyze(&source);
    assert_has_message(
        &diags,
        "V1001",
        "function \"Two\" has odd docstring: need a blank line after the 'Errors:' block indicator",
    );
    // No fact export for functions whose docstring failed to parse.
    assert!(facts.function_codes("demo", "Two").is_none());
}

#[test]
fn test_odd_docstring_repeated_indicator() {
    let source = format!(
        r#"package demo
{}
// Rep is a demo function.
//
// Errors:
//
//    - hello-error -- is always returned.
//
// Errors:
//
//    - hello-error -- is always returned.
func Rep() error {{
	return &Error{{"hello-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(&diags, "V1001", "repeated 'Errors:' block indicator");
}

#[test]
fn test_explicit_none_with_actual_error_is_a_mismatch() {
    let source = format!(
        r#"package demo
{}
// Liar declares no errors but returns one.
//
// Errors: none
func Liar() error {{
	return &Error{{"boom-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, facts) = analyze(&source);
    assert_has_message(&diags, "V1003", "missing codes: [boom-error]");
    // The declared (empty) set is still the exported contract.
    let fact = facts.function_codes("demo", "Liar").expect("fact");
    assert!(fact.codes.is_empty());
}

#[test]
fn test_explicit_none_with_nil_return_is_clean() {
    let source = r#"package demo

// Honest returns no errors and says so.
//
// Errors: none
func Honest() error {
	return nil
}
"#;
    let (diags, facts) = analyze(source);
    assert_clean(&diags);
    assert!(facts.function_codes("demo", "Honest").is_some());
}

#[test]
fn test_opaque_package_call() {
    let source = format!(
        r#"package demo

import "other"
{}
// CallOther forwards an error from another package.
//
// Errors:
//
//    - remote-error -- passed through
func CallOther() error {{
	return other.Foo()
}}
"#,
        ERROR_TYPE
    );
    let (diags, facts) = analyze(&source);
    assert_has_message(
        &diags,
        "V3006",
        "function \"Foo\" in package \"other\" does not declare error codes",
    );
    // The declared contract is exported regardless.
    let fact = facts.function_codes("demo", "CallOther").expect("fact");
    assert_eq!(fact.codes, vec!["remote-error"]);
}

#[test]
fn test_imported_facts_resolve_foreign_calls() {
    let other = r#"package other

type Error struct {
	TheCode string
}

func (e *Error) Code() string { return e.TheCode }
func (e *Error) Error() string { return e.TheCode }

// Foo is a demo function.
//
// Errors:
//
//    - remote-error -- is always returned
func Foo() error {
	return &Error{"remote-error"}
}
"#;
    let caller = r#"package demo

import "other"

// CallOther forwards an error from another package.
//
// Errors:
//
//    - remote-error -- passed through
func CallOther() error {
	return other.Foo()
}
"#;
    let mut facts = FactStore::new();
    let other_diags = analyze_with_store(other, &mut facts);
    assert_clean(&other_diags);

    let caller_diags = analyze_with_store(caller, &mut facts);
    assert_clean(&caller_diags);
}

#[test]
fn test_mutual_recursion_converges() {
    let source = format!(
        r#"package demo
{}
// A is a demo function.
//
// Errors:
//
//    - x-error -- sometimes
//    - y-error -- sometimes
func A(n int) error {{
	if n == 0 {{
		return &Error{{"x-error"}}
	}}
	return B(n)
}}

// B is a demo function.
//
// Errors:
//
//    - x-error -- sometimes
//    - y-error -- sometimes
func B(n int) error {{
	if n == 1 {{
		return &Error{{"y-error"}}
	}}
	return A(n)
}}
"#,
        ERROR_TYPE
    );
    let (diags, facts) = analyze(&source);
    assert_clean(&diags);
    assert_eq!(
        facts.function_codes("demo", "A").unwrap().codes,
        vec!["x-error", "y-error"]
    );
    assert_eq!(
        facts.function_codes("demo", "B").unwrap().codes,
        vec!["x-error", "y-error"]
    );
}

#[test]
fn test_mutual_recursion_is_order_independent() {
    // Same shape with the declarations swapped; the fixed point must
    // reach the same answer.
    let source = format!(
        r#"package demo
{}
// B is a demo function.
//
// Errors:
//
//    - x-error -- sometimes
//    - y-error -- sometimes
func B(n int) error {{
	if n == 1 {{
		return &Error{{"y-error"}}
	}}
	return A(n)
}}

// A is a demo function.
//
// Errors:
//
//    - x-error -- sometimes
//    - y-error -- sometimes
func A(n int) error {{
	if n == 0 {{
		return &Error{{"x-error"}}
	}}
	return B(n)
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_error_in_non_last_position() {
    let source = r#"package demo

func Backwards() (error, int) {
	return nil, 1
}
"#;
    let (diags, _) = analyze(source);
    assert_has_message(&diags, "V2001", "error should be returned as the last argument");
}

#[test]
fn test_destructuring_last_position_is_followed() {
    let source = format!(
        r#"package demo
{}
// F forwards helper's error.
//
// Errors:
//
//    - boom-error -- always
func F() error {{
	x, err := helper()
	_ = x
	return err
}}

// helper is a helper.
//
// Errors:
//
//    - boom-error -- always
func helper() (int, error) {{
	return 1, &Error{{"boom-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_destructuring_non_last_position_is_unsupported() {
    let source = format!(
        r#"package demo
{}
// G tracks an error that is not the last result.
//
// Errors:
//
//    - boom-error -- always
func G() error {{
	err, x := backwards()
	_ = x
	return err
}}

func backwards() (error, int) {{
	return &Error{{"boom-error"}}, 1
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(
        &diags,
        "V3004",
        "unsupported: tracking error codes for function call with error as non-last return argument",
    );
}

#[test]
fn test_returning_parameter_is_reported() {
    let source = format!(
        r#"package demo
{}
// P returns its own parameter.
//
// Errors:
//
//    - param-error -- never
func P(err error) error {{
	return err
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(
        &diags,
        "V3003",
        "returned error may not be a parameter, receiver or global variable",
    );
    assert_has_message(&diags, "V1003", "unused codes: [param-error]");
}

#[test]
fn test_returning_global_is_reported() {
    let source = format!(
        r#"package demo
{}
var sentinel = &Error{{"global-error"}}

// GlobalReturn returns a package-level sentinel.
//
// Errors:
//
//    - global-error -- always
func GlobalReturn() error {{
	return sentinel
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(
        &diags,
        "V3003",
        "returned error may not be a parameter, receiver or global variable",
    );
}

#[test]
fn test_named_result_bare_return() {
    let source = format!(
        r#"package demo
{}
// Named assigns its named result before a bare return.
//
// Errors:
//
//    - boom-error -- always
func Named() (err error) {{
	err = &Error{{"boom-error"}}
	return
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_assignment_inside_function_literal() {
    let source = format!(
        r#"package demo
{}
// Closure assigns the error from inside a function literal.
//
// Errors:
//
//    - closure-error -- always
func Closure() error {{
	var err error
	run := func() {{
		err = &Error{{"closure-error"}}
	}}
	run()
	return err
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_keyed_composite_field_extraction() {
    let source = format!(
        r#"package demo
{}
// Keyed instantiates the code field by name.
//
// Errors:
//
//    - keyed-error -- always
func Keyed() error {{
	return &Error{{TheCode: "keyed-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_const_code_field_extraction() {
    let source = format!(
        r#"package demo
{}
const codeBoom = "const-error"

// FromConst instantiates the code field from a package constant.
//
// Errors:
//
//    - const-error -- always
func FromConst() error {{
	return &Error{{codeBoom}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_non_constant_code_field() {
    let source = format!(
        r#"package demo
{}
// Dyn builds an error from a runtime value.
//
// Errors:
//
//    - dyn-error -- never
func Dyn(code string) error {{
	return &Error{{code}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_has_message(
        &diags,
        "V3009",
        "error code field has to be instantiated by constant value",
    );
}

#[test]
fn test_constant_code_type_and_conversion() {
    let source = r#"package demo

type StringError string

func (StringError) Code() string { return "string-error" }
func (StringError) Error() string { return "string failure" }

// Convert returns a converted error value.
//
// Errors:
//
//    - string-error -- always
func Convert(msg string) error {
	return StringError(msg)
}
"#;
    let (diags, facts) = analyze(source);
    assert_clean(&diags);

    let ty = facts.error_type("demo", "StringError").expect("type fact");
    assert_eq!(ty.codes.as_deref(), Some(&["string-error".to_string()][..]));
    assert!(ty.field.is_none());
}

#[test]
fn test_error_type_facts_exported_for_unused_types() {
    let source = r#"package demo

type UnusedError struct {
	TheCode string
}

func (e *UnusedError) Code() string { return e.TheCode }
func (e *UnusedError) Error() string { return e.TheCode }
"#;
    let (diags, facts) = analyze(source);
    assert_clean(&diags);
    assert!(facts.error_type("demo", "UnusedError").is_some());
}

#[test]
fn test_illegible_code_method() {
    let source = r#"package demo

type Opaque struct {
	a string
	b string
}

func (o *Opaque) Code() string {
	if true {
		return o.a
	}
	return o.b
}
func (o *Opaque) Error() string { return "opaque" }

// UseOpaque returns an error whose code cannot be decided.
//
// Errors:
//
//    - opaque-error -- supposedly
func UseOpaque() error {
	return &Opaque{"x", "y"}
}
"#;
    let (diags, _) = analyze(source);
    assert_has_message(
        &diags,
        "V3007",
        "function \"Code\" should always return a string constant or a single field",
    );
    assert_has_message(
        &diags,
        "V3002",
        "expression is not a valid error: error types must return constant error codes or a single field",
    );
}

#[test]
fn test_promoted_field_is_rejected() {
    let source = r#"package demo

type Base struct {
	TheCode string
}

type Wrapped struct {
	Base
	Other string
}

func (w *Wrapped) Code() string { return w.TheCode }
func (w *Wrapped) Error() string { return "wrapped" }
"#;
    let (diags, _) = analyze(source);
    assert_has_message(
        &diags,
        "V3010",
        "returned field TheCode is not a valid error code field (promoted fields not supported)",
    );
}

#[test]
fn test_invalid_constant_code_in_code_method() {
    let source = r#"package demo

type BadCode struct{}

func (BadCode) Code() string { return "-bad-" }
func (BadCode) Error() string { return "bad" }
"#;
    let (diags, _) = analyze(source);
    assert_has_message(&diags, "V3008", "error code has invalid format");
}

#[test]
fn test_cause_method_is_exempt() {
    let source = r#"package demo

type CausedError struct {
	TheCode string
	cause   error
}

func (e *CausedError) Code() string { return e.TheCode }
func (e *CausedError) Error() string { return e.TheCode }
func (e *CausedError) Cause() error { return e.cause }
"#;
    let (diags, _) = analyze(source);
    // Cause() is exported and undeclared, but exempt.
    assert_clean(&diags);
}

#[test]
fn test_other_methods_of_cause_types_are_not_exempt() {
    let source = r#"package demo

type CausedError struct {
	TheCode string
	cause   error
}

func (e *CausedError) Code() string { return e.TheCode }
func (e *CausedError) Error() string { return e.TheCode }
func (e *CausedError) Cause() error { return e.cause }

func (e *CausedError) Unwrap() error {
	return e.cause
}
"#;
    let (diags, _) = analyze(source);
    assert_has_message(
        &diags,
        "V1002",
        "function \"Unwrap\" is exported, but does not declare any error codes",
    );
}

#[test]
fn test_method_call_resolution() {
    let source = format!(
        r#"package demo
{}
type Maker struct{{}}

// Make creates an error.
//
// Errors:
//
//    - made-error -- always
func (m Maker) Make() error {{
	return &Error{{"made-error"}}
}}

// UseMaker forwards Make's error.
//
// Errors:
//
//    - made-error -- always
func UseMaker() error {{
	m := Maker{{}}
	return m.Make()
}}
"#,
        ERROR_TYPE
    );
    let (diags, facts) = analyze(&source);
    assert_clean(&diags);
    assert!(facts.function_codes("demo", "Maker.Make").is_some());
}

#[test]
fn test_interface_method_call_is_opaque() {
    let source = r#"package demo

type Failer interface {
	Fail() error
}

// UseFailer cannot see through the interface.
//
// Errors:
//
//    - fail-error -- supposedly
func UseFailer(f Failer) error {
	return f.Fail()
}
"#;
    let (diags, _) = analyze(source);
    assert_has_message(&diags, "V3005", "called function does not declare error codes");
}

#[test]
fn test_uncoded_error_type_does_not_define_codes() {
    let source = r#"package demo

type Plain struct {
	msg string
}

func (p *Plain) Error() string { return p.msg }

// UsePlain returns an error without a Code method.
//
// Errors:
//
//    - plain-error -- never
func UsePlain() error {
	return &Plain{"x"}
}
"#;
    let (diags, _) = analyze(source);
    assert_has_message(&diags, "V3001", "expression does not define an error code");
}

#[test]
fn test_self_assignment_terminates() {
    let source = format!(
        r#"package demo
{}
// Selfie reassigns the error to itself.
//
// Errors:
//
//    - boom-error -- always
func Selfie() error {{
	err := makeBoom()
	err = err
	return err
}}

// makeBoom is a helper.
//
// Errors:
//
//    - boom-error -- always
func makeBoom() error {{
	return &Error{{"boom-error"}}
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    assert_clean(&diags);
}

#[test]
fn test_diagnostics_are_position_sorted() {
    let source = format!(
        r#"package demo
{}
// Late declares nothing it does.
//
// Errors:
//
//    - a-error -- never
func Late(err error) error {{
	return err
}}

func Backwards() (error, int) {{
	return nil, 1
}}
"#,
        ERROR_TYPE
    );
    let (diags, _) = analyze(&source);
    let positions: Vec<usize> = diags.diagnostics().iter().map(|d| d.span.start).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}
