//! Lexer for Vo source files
//!
//! Vo terminates statements at newlines, so the lexer performs automatic
//! semicolon insertion: a newline after a token that can end a statement
//! yields a `Semi` token. Comments are collected as trivia so the parser
//! can attach doc comments to declarations.

use crate::diagnostics::Span;
use crate::syntax::span::SourceFile;
use logos::Logos;

/// Token types for Vo
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
pub enum TokenKind {
    // Keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("func")]
    Func,
    #[token("type")]
    Type,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("const")]
    Const,
    #[token("var")]
    Var,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLit(i64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    StringLit(String),

    // Identifiers (predeclared names like `nil`, `true`, `false`, `error`
    // and `string` are identifiers too; the resolver gives them meaning)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Punctuation and operators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("=")]
    Assign,
    #[token(":=")]
    Define,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,

    // Trivia (filtered out by the Lexer wrapper)
    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*", |lex| lex.slice().to_string())]
    LineComment(String),

    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", |lex| lex.slice().to_string())]
    BlockComment(String),

    // End of file
    Eof,
}

/// Process escape sequences in a string literal
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A comment collected as trivia, with the lines it covers
#[derive(Debug, Clone)]
pub struct Comment {
    /// Comment text including the `//` or `/*` markers
    pub text: String,
    pub span: Span,
    pub start_line: usize,
    pub end_line: usize,
    /// False when code precedes the comment on its line (trailing comments
    /// never contribute to doc comments)
    pub own_line: bool,
}

/// Lexer for Vo source code
pub struct Lexer<'a> {
    source: &'a SourceFile,
    logos_lexer: logos::Lexer<'a, TokenKind>,
    comments: Vec<Comment>,
    /// Whether the previously emitted token can end a statement
    insert_semi: bool,
    /// Line on which the last significant token ended
    last_token_line: usize,
    at_eof: bool,
    /// Span of the first invalid input, if any was skipped
    error_span: Option<Span>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source file
    pub fn new(source: &'a SourceFile) -> Self {
        Self {
            source,
            logos_lexer: TokenKind::lexer(source.content()),
            comments: Vec::new(),
            insert_semi: false,
            last_token_line: 0,
            at_eof: false,
            error_span: None,
        }
    }

    /// Comments collected so far, in source order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Where the first invalid input was skipped, if any
    pub fn invalid_token_span(&self) -> Option<&Span> {
        self.error_span.as_ref()
    }

    /// Get the next significant token
    pub fn next_token(&mut self) -> Token {
        loop {
            if self.at_eof {
                return self.eof_token();
            }

            match self.logos_lexer.next() {
                Some(Ok(kind)) => {
                    let range = self.logos_lexer.span();
                    let span = self.source.span(range.start, range.end);
                    match kind {
                        TokenKind::Newline => {
                            if self.insert_semi {
                                self.insert_semi = false;
                                return Token::new(TokenKind::Semi, span);
                            }
                        }
                        TokenKind::LineComment(text) => {
                            self.comments.push(Comment {
                                text,
                                start_line: span.line,
                                end_line: span.line,
                                own_line: span.line > self.last_token_line,
                                span,
                            });
                        }
                        TokenKind::BlockComment(text) => {
                            // A block comment spanning lines counts as a
                            // line break for semicolon insertion.
                            let multiline = text.contains('\n');
                            let last_offset = range.end.saturating_sub(1);
                            self.comments.push(Comment {
                                text,
                                start_line: span.line,
                                end_line: self.source.line_of(last_offset),
                                own_line: span.line > self.last_token_line,
                                span: span.clone(),
                            });
                            if multiline && self.insert_semi {
                                self.insert_semi = false;
                                return Token::new(TokenKind::Semi, span);
                            }
                        }
                        kind => {
                            self.insert_semi = matches!(
                                kind,
                                TokenKind::Ident(_)
                                    | TokenKind::IntLit(_)
                                    | TokenKind::StringLit(_)
                                    | TokenKind::RParen
                                    | TokenKind::RBrace
                                    | TokenKind::Return
                            );
                            // No token crosses a line break, so the span's
                            // anchor line is also where the token ends.
                            self.last_token_line = span.line;
                            return Token::new(kind, span);
                        }
                    }
                }
                Some(Err(())) => {
                    // Skip the offending input; the parser reports it once
                    // the file is done.
                    let range = self.logos_lexer.span();
                    if self.error_span.is_none() {
                        self.error_span = Some(self.source.span(range.start, range.end));
                    }
                }
                None => {
                    self.at_eof = true;
                    if self.insert_semi {
                        self.insert_semi = false;
                        let len = self.source.content().len();
                        return Token::new(TokenKind::Semi, self.source.span(len, len));
                    }
                    return self.eof_token();
                }
            }
        }
    }

    fn eof_token(&self) -> Token {
        let len = self.source.content().len();
        Token::new(TokenKind::Eof, self.source.span(len, len))
    }
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
