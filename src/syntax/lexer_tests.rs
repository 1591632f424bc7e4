use super::*;
use std::path::PathBuf;

fn lex_all(source: &str) -> Vec<TokenKind> {
    let file = SourceFile::new(PathBuf::from("demo.vo"), source.to_string());
    let mut lexer = Lexer::new(&file);
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        kinds.push(token.kind);
    }
    kinds
}

#[test]
fn test_keywords_and_idents() {
    let kinds = lex_all("package demo");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Package,
            TokenKind::Ident("demo".to_string()),
            TokenKind::Semi,
        ]
    );
}

#[test]
fn test_semicolon_insertion_after_rbrace() {
    let kinds = lex_all("func F() {\n}\n");
    assert_eq!(kinds.last(), Some(&TokenKind::Semi));
}

#[test]
fn test_no_semicolon_after_operators() {
    // A trailing `&&` keeps the statement open across the newline;
    // the only semicolon is the one inserted at end of file.
    let kinds = lex_all("x &&\ny");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident("x".to_string()),
            TokenKind::AndAnd,
            TokenKind::Ident("y".to_string()),
            TokenKind::Semi,
        ]
    );
}

#[test]
fn test_string_escapes() {
    let kinds = lex_all(r#""a\nb""#);
    assert_eq!(kinds[0], TokenKind::StringLit("a\nb".to_string()));
}

#[test]
fn test_define_vs_colon() {
    let kinds = lex_all("x := y");
    assert!(kinds.contains(&TokenKind::Define));

    let kinds = lex_all("TheCode: x");
    assert!(kinds.contains(&TokenKind::Colon));
}

#[test]
fn test_comments_are_trivia() {
    let file = SourceFile::new(
        PathBuf::from("demo.vo"),
        "// doc line\nfunc F() {}\n".to_string(),
    );
    let mut lexer = Lexer::new(&file);
    let first = lexer.next_token();
    assert_eq!(first.kind, TokenKind::Func);
    assert_eq!(lexer.comments().len(), 1);
    assert_eq!(lexer.comments()[0].text, "// doc line");
    assert_eq!(lexer.comments()[0].start_line, 1);
}

#[test]
fn test_multiline_block_comment_breaks_statement() {
    let kinds = lex_all("x /* one\ntwo */ y");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident("x".to_string()),
            TokenKind::Semi,
            TokenKind::Ident("y".to_string()),
            TokenKind::Semi,
        ]
    );
}
