use super::*;

#[test]
fn test_no_block() {
    assert_eq!(find_error_docs("Just a regular doc comment.\n"), Ok(None));
    assert_eq!(find_error_docs(""), Ok(None));
}

#[test]
fn test_simple_block() {
    let doc = "\
F is a demo function.

Errors:

   - hello-error -- is always returned
   - other-error -- on bad input
";
    let codes = find_error_docs(doc).unwrap().unwrap();
    assert_eq!(codes.to_sorted_vec(), vec!["hello-error", "other-error"]);
}

#[test]
fn test_prose_between_code_lines() {
    let doc = "\
Correct is a demo function.

Errors:

   - hello-error       -- is always returned
The following error codes should not occur:
   - hello-unreachable -- should never be returned
   - hello-unreachable --

After a blank line comments in any format may follow.
";
    let codes = find_error_docs(doc).unwrap().unwrap();
    assert_eq!(
        codes.to_sorted_vec(),
        vec!["hello-error", "hello-unreachable"]
    );
}

#[test]
fn test_explicit_none() {
    let codes = find_error_docs("F does nothing.\n\nErrors: none\n")
        .unwrap()
        .unwrap();
    assert!(codes.is_empty());
}

#[test]
fn test_none_with_rationale() {
    let doc = "Errors: none -- some optional docu here why no errors are returned\n";
    let codes = find_error_docs(doc).unwrap().unwrap();
    assert!(codes.is_empty());
}

#[test]
fn test_missing_blank_line() {
    let doc = "\
Two is a test function.

Errors:
   - hello-error -- is always returned.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::NeedBlankLine));
}

#[test]
fn test_repeated_indicator_back_to_back() {
    let doc = "\
Errors:

Errors:

   - hello-error -- is always returned.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::RepeatedIndicator));
}

#[test]
fn test_repeated_indicator_after_closed_block() {
    let doc = "\
Errors:

   - hello-error -- is always returned.

Errors:

   - hello-error -- is always returned.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::RepeatedIndicator));
}

#[test]
fn test_repeated_indicator_after_none() {
    let doc = "\
Errors: none

Errors:

   - hello-error -- is always returned.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::RepeatedIndicator));
}

#[test]
fn test_single_dash_is_not_a_separator() {
    let doc = "\
Errors:

   - hello-error - is always returned.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::MissingSeparator));
}

#[test]
fn test_whitespace_code() {
    let doc = "\
Errors:

   - hello-error -- is always returned.
   - -- is invalid.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::WhitespaceCode));

    let doc = "\
Errors:

   - hello-error -- is always returned.
   -             -- is invalid.
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::WhitespaceCode));
}

#[test]
fn test_invalid_code_formats() {
    for code in ["invalid-", "-invalid", "0invalid-error", "invalid(error)-code", "invalid error"] {
        let doc = format!("Errors:\n\n - {} -- bad format\n", code);
        assert_eq!(
            find_error_docs(&doc),
            Err(DocParseError::InvalidCodeFormat),
            "code {:?}",
            code
        );
    }
}

#[test]
fn test_param_codes_are_rejected() {
    let doc = "\
Errors:

   - param: code   -- is used if the provided flag is true
   - unknown-error -- is used otherwise
";
    assert_eq!(find_error_docs(doc), Err(DocParseError::ParamNotSupported));
}

#[test]
fn test_indicator_trailing_text() {
    assert_eq!(
        find_error_docs("Errors: whatever\n"),
        Err(DocParseError::IndicatorTrailingText)
    );
}

#[test]
fn test_block_at_end_of_doc_without_codes() {
    // An opened block that ends with the doc is missing its blank line.
    assert_eq!(
        find_error_docs("Errors:\n"),
        Err(DocParseError::NeedBlankLine)
    );
}

#[test]
fn test_duplicate_codes_collapse() {
    let doc = "\
Errors:

   - hello-error -- once
   - hello-error -- twice
";
    let codes = find_error_docs(doc).unwrap().unwrap();
    assert_eq!(codes.len(), 1);
}
