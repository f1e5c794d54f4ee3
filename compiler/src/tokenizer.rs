use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::ProtogenError;

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(concat!(
        r"(//[^\n]*",                           // line comment
        r"|/\*(?s:.*?)\*/",                     // block comment
        r"|`[^`]*`",                            // raw string
        r#"|"(?:[^"\\\n]|\\.)*""#,              // interpreted string
        r"|'(?:[^'\\\n]|\\.)*'",                // rune literal
        r"|\.\.\.|<-|:=|&&|\|\||==|!=|<=|>=|<<|>>|&\^|\+\+|--",
        r"|[\p{L}_][\p{L}\p{N}_]*",             // identifier or keyword
        r"|\d[0-9A-Za-z_.]*|\.\d[0-9A-Za-z_]*", // number
        r"|\n|[ \t\r]+",
        r"|[-+*/%&|^<>=!:.,;(){}\[\]~])",
    )).unwrap();
    pub static ref WHITESPACE_RX: Regex = Regex::new(r"^(/\*(?s:.*)\*/|[ \t\r]+)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Comment,
    Newline,
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.kind != TokenKind::Str && self.kind != TokenKind::Comment && self.text == text
    }
}

fn classify(part: &str) -> TokenKind {
    let first = part.chars().next().unwrap_or(' ');
    if part == "\n" {
        TokenKind::Newline
    } else if part.starts_with("//") {
        TokenKind::Comment
    } else if first == '"' || first == '`' || first == '\'' {
        TokenKind::Str
    } else if first.is_alphabetic() || first == '_' {
        TokenKind::Ident
    } else if first.is_ascii_digit() || (first == '.' && part.len() > 1 && part != "...") {
        TokenKind::Number
    } else {
        TokenKind::Punct
    }
}

/// Splits Go source into tokens. Newlines and `//` comments are kept because
/// the parser needs them for statement ends and doc comments; block comments
/// and other whitespace are dropped. The last token is always `Eof`.
pub fn tokenize_source(file: &str, text: &str) -> Result<Vec<Token>, ProtogenError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end   = mat.end();
        let part  = mat.as_str();

        if start > last_end {
            // Unexpected text between last_end and start
            let unexpected = &text[last_end..start];
            return Err(error(
                file,
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !WHITESPACE_RX.is_match(part) {
            tokens.push(Token {
                kind:   classify(part),
                text:   part.to_string(),
                line,
                column,
            });
        }

        // Update line/column
        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.chars().count() + 1;
            }
        } else {
            column += part.chars().count();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            file,
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    // Append EOF token
    tokens.push(Token {
        kind:   TokenKind::Eof,
        text:   "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}
