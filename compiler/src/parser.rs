use crate::{
    tokenizer::{Token, TokenKind},
    types::{DeclarationKind, FieldDecl, FieldMetadata, MethodDecl, Param, SourceDeclaration, TypeExpr},
    utils::{error, quote},
    error::ProtogenError,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    static ref TAG_ENTRY: Regex = Regex::new(r#"([A-Za-z0-9_.-]+):"((?:[^"\\]|\\.)*)""#).unwrap();
    static ref DIRECTIVE: Regex = Regex::new(r"^(go:|\+build|nolint|lint:)").unwrap();
}

/// Declarations of one source file, plus its `package` clause.
#[derive(Debug, PartialEq)]
pub struct ParsedFile {
    pub package:      String,
    pub declarations: Vec<SourceDeclaration>,
}

/// Parses the declaration-level structure of a Go file.
///
/// Only `type` declarations are kept. Imports, functions, constants and
/// variables are skipped without looking inside them. Generic type
/// declarations are skipped with a warning.
pub fn parse_source(file: &str, tokens: &[Token]) -> Result<ParsedFile, ProtogenError> {
    Parser::new(file, tokens).parse_file()
}

/// Parses a struct tag literal (raw or interpreted) into its `key:"value"` entries.
pub fn parse_struct_tag(literal: &str) -> FieldMetadata {
    let inner = if let Some(raw) = literal.strip_prefix('`') {
        raw.trim_end_matches('`').to_string()
    } else if let Some(quoted) = literal.strip_prefix('"') {
        quoted
            .trim_end_matches('"')
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else {
        literal.to_string()
    };

    FieldMetadata {
        entries: TAG_ENTRY
            .captures_iter(&inner)
            .map(|cap| (cap[1].to_string(), cap[2].to_string()))
            .collect(),
    }
}

enum ParamItem {
    Named(String, TypeExpr),
    Bare(TypeExpr),
}

struct Parser<'a> {
    file:     &'a str,
    tokens:   &'a [Token],
    index:    usize,
    eof:      Token,
    /// `//` comments seen since the last declaration, as `(line, text)`.
    comments: Vec<(usize, String)>,
}

impl<'a> Parser<'a> {
    fn new(file: &'a str, tokens: &'a [Token]) -> Self {
        let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
        Parser {
            file,
            tokens,
            index: 0,
            eof: Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
            },
            comments: Vec::new(),
        }
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.index + offset).unwrap_or(&self.eof)
    }

    fn previous_line(&self) -> usize {
        self.index
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.index += 1;
        }
        tok
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.current().is(text) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> Result<(), ProtogenError> {
        if !self.eat(text) {
            let tok = self.current();
            return Err(error(
                self.file,
                &format!("Expected {} but found {}", quote(text), quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(())
    }

    fn expect_ident(&mut self) -> Result<Token, ProtogenError> {
        if self.current().kind != TokenKind::Ident {
            let tok = self.current();
            return Err(error(
                self.file,
                &format!("Expected identifier but found {}", quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(self.advance())
    }

    fn unexpected_token(&self) -> ProtogenError {
        let tok = self.current();
        let text = if tok.kind == TokenKind::Eof { "end of file" } else { tok.text.as_str() };
        error(
            self.file,
            &format!("Unexpected token {}", quote(text)),
            tok.line,
            tok.column,
        )
    }

    /// Skips newlines and semicolons, remembering comments for doc extraction.
    fn skip_trivia(&mut self) {
        loop {
            let tok = self.current();
            match tok.kind {
                TokenKind::Newline => {}
                TokenKind::Comment => self.comments.push((tok.line, tok.text.clone())),
                TokenKind::Punct if tok.text == ";" => {}
                _ => return,
            }
            self.index += 1;
        }
    }

    /// Drops a comment that trails the member just parsed on the same line.
    fn skip_trailing_comment(&mut self) {
        if self.current().kind == TokenKind::Comment && self.current().line == self.previous_line() {
            self.index += 1;
        }
    }

    /// The contiguous block of `//` lines ending right above `line`.
    fn take_docs(&mut self, line: usize) -> String {
        let mut lines = Vec::new();
        let mut expected = line;
        for (comment_line, text) in self.comments.iter().rev() {
            if *comment_line + 1 != expected {
                break;
            }
            lines.push(text.as_str());
            expected = *comment_line;
        }
        lines.reverse();

        let docs: Vec<String> = lines
            .into_iter()
            .map(|text| {
                let text = text.trim_start_matches("//");
                text.strip_prefix(' ').unwrap_or(text).trim_end().to_string()
            })
            .filter(|text| !DIRECTIVE.is_match(text))
            .collect();
        self.comments.clear();
        docs.join("\n")
    }

    /// Skips to the matching `close`; the opening token is already consumed.
    fn skip_balanced(&mut self, open: &str, close: &str) -> Result<(), ProtogenError> {
        let mut depth = 1;
        while depth > 0 {
            if self.current().kind == TokenKind::Eof {
                return Err(self.unexpected_token());
            }
            let tok = self.advance();
            if tok.is(open) {
                depth += 1;
            } else if tok.is(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Skips a single-line statement, following brackets across lines.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        loop {
            let tok = self.current();
            match tok.kind {
                TokenKind::Eof => return,
                TokenKind::Newline if depth == 0 => return,
                TokenKind::Punct if tok.text == ";" && depth == 0 => return,
                TokenKind::Punct if matches!(tok.text.as_str(), "(" | "[" | "{") => depth += 1,
                TokenKind::Punct if matches!(tok.text.as_str(), ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.index += 1;
        }
    }

    /// Skips a function declaration: signature and, if present, its body.
    fn skip_func(&mut self) -> Result<(), ProtogenError> {
        let mut depth = 0usize;
        let mut previous = String::new();
        loop {
            let tok = self.current().clone();
            match tok.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Newline if depth == 0 => return Ok(()),
                _ => {}
            }
            self.index += 1;
            if tok.is("(") || tok.is("[") {
                depth += 1;
            } else if tok.is(")") || tok.is("]") {
                depth = depth.saturating_sub(1);
            } else if tok.is("{") {
                self.skip_balanced("{", "}")?;
                // `interface{}` and `struct{}` in the signature are not the body
                if depth == 0 && previous != "interface" && previous != "struct" {
                    return Ok(());
                }
            }
            previous = tok.text;
        }
    }

    fn parse_file(mut self) -> Result<ParsedFile, ProtogenError> {
        let mut package      = None;
        let mut declarations = Vec::new();

        loop {
            self.skip_trivia();
            let tok = self.current().clone();
            if tok.kind == TokenKind::Eof {
                break;
            }

            if tok.is("package") {
                self.advance();
                package = Some(self.expect_ident()?.text);
                self.comments.clear();
            } else if tok.is("import") {
                self.advance();
                if self.eat("(") {
                    self.skip_balanced("(", ")")?;
                } else {
                    self.skip_statement();
                }
                self.comments.clear();
            } else if tok.is("type") {
                self.advance();
                if self.eat("(") {
                    self.comments.clear();
                    loop {
                        self.skip_trivia();
                        if self.eat(")") {
                            break;
                        }
                        if self.current().kind == TokenKind::Eof {
                            return Err(self.unexpected_token());
                        }
                        let line = self.current().line;
                        let docs = self.take_docs(line);
                        if let Some(decl) = self.parse_type_spec(docs)? {
                            declarations.push(decl);
                        }
                    }
                } else {
                    let docs = self.take_docs(tok.line);
                    if let Some(decl) = self.parse_type_spec(docs)? {
                        declarations.push(decl);
                    }
                }
            } else if tok.is("func") {
                self.advance();
                self.skip_func()?;
                self.comments.clear();
            } else if tok.is("const") || tok.is("var") {
                self.advance();
                if self.eat("(") {
                    self.skip_balanced("(", ")")?;
                } else {
                    self.skip_statement();
                }
                self.comments.clear();
            } else {
                return Err(self.unexpected_token());
            }
        }

        let package = package.ok_or_else(|| error(self.file, "Missing package clause", 1, 1))?;
        Ok(ParsedFile {
            package,
            declarations,
        })
    }

    fn parse_type_spec(&mut self, docs: String) -> Result<Option<SourceDeclaration>, ProtogenError> {
        let name_tok = self.expect_ident()?;

        // `type List[T any] struct {...}`, as opposed to `type Hash [32]byte`
        if self.current().is("[") && self.peek(1).kind == TokenKind::Ident {
            let after = self.peek(2);
            if after.kind == TokenKind::Ident || after.is(",") || after.is("~") || after.is("*") {
                warn!(
                    file = self.file,
                    line = name_tok.line,
                    declaration = %name_tok.text,
                    "skipping generic type declaration"
                );
                self.advance();
                self.skip_balanced("[", "]")?;
                self.skip_statement();
                return Ok(None);
            }
        }

        // Alias declarations resolve like defined types
        self.eat("=");

        let kind = if self.eat("struct") {
            DeclarationKind::Record(self.parse_struct_body()?)
        } else if self.eat("interface") {
            match self.parse_interface_body()? {
                Some(methods) => DeclarationKind::Contract(methods),
                None => {
                    warn!(
                        file = self.file,
                        line = name_tok.line,
                        declaration = %name_tok.text,
                        "skipping type-set constraint interface"
                    );
                    return Ok(None);
                }
            }
        } else {
            DeclarationKind::Defined(self.parse_type()?)
        };

        Ok(Some(SourceDeclaration {
            name:   name_tok.text,
            docs,
            file:   self.file.to_string(),
            line:   name_tok.line,
            column: name_tok.column,
            kind,
        }))
    }

    fn is_field_end(tok: &Token) -> bool {
        matches!(
            tok.kind,
            TokenKind::Newline | TokenKind::Str | TokenKind::Comment | TokenKind::Eof
        ) || tok.is(";")
            || tok.is("}")
    }

    fn parse_struct_body(&mut self) -> Result<Vec<FieldDecl>, ProtogenError> {
        self.expect("{")?;
        self.comments.clear();

        let mut fields = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat("}") {
                break;
            }
            let start = self.current().clone();
            if start.kind == TokenKind::Eof {
                return Err(self.unexpected_token());
            }
            let docs = self.take_docs(start.line);

            let embedded = start.is("*")
                || (start.kind == TokenKind::Ident
                    && (self.peek(1).is(".") || Self::is_field_end(self.peek(1))));

            if embedded {
                let type_ = self.parse_type()?;
                let metadata = self.parse_tag();
                fields.push(FieldDecl {
                    name: None,
                    type_,
                    metadata,
                    docs,
                    line: start.line,
                    column: start.column,
                });
            } else {
                let mut names = vec![self.expect_ident()?];
                while self.eat(",") {
                    self.skip_trivia();
                    names.push(self.expect_ident()?);
                }
                let type_ = self.parse_type()?;
                let metadata = self.parse_tag();
                for name in names {
                    fields.push(FieldDecl {
                        name:     Some(name.text),
                        type_:    type_.clone(),
                        metadata: metadata.clone(),
                        docs:     docs.clone(),
                        line:     name.line,
                        column:   name.column,
                    });
                }
            }

            self.skip_trailing_comment();
            if !Self::is_field_end(self.current()) {
                return Err(self.unexpected_token());
            }
        }
        Ok(fields)
    }

    fn parse_tag(&mut self) -> FieldMetadata {
        if self.current().kind == TokenKind::Str {
            let literal = self.advance().text;
            parse_struct_tag(&literal)
        } else {
            FieldMetadata::default()
        }
    }

    /// Methods and embedded contracts of an interface body. `None` for a
    /// type-set constraint (`~int | ~float64`), whose body is skipped.
    fn parse_interface_body(&mut self) -> Result<Option<Vec<MethodDecl>>, ProtogenError> {
        self.expect("{")?;
        self.comments.clear();

        let mut methods = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat("}") {
                break;
            }
            let start = self.current().clone();
            if start.kind == TokenKind::Eof {
                return Err(self.unexpected_token());
            }
            let docs = self.take_docs(start.line);

            if start.kind == TokenKind::Ident && self.peek(1).is("(") {
                self.advance();
                let params = self.parse_params()?;
                let results = self.parse_results()?;
                methods.push(MethodDecl {
                    name: Some(start.text),
                    embedded: None,
                    params,
                    results,
                    docs,
                    line: start.line,
                    column: start.column,
                });
            } else {
                if start.is("~") {
                    self.skip_balanced("{", "}")?;
                    return Ok(None);
                }
                let type_ = self.parse_type()?;
                if self.current().is("|") {
                    self.skip_balanced("{", "}")?;
                    return Ok(None);
                }
                methods.push(MethodDecl {
                    name: None,
                    embedded: Some(type_),
                    params: Vec::new(),
                    results: Vec::new(),
                    docs,
                    line: start.line,
                    column: start.column,
                });
            }

            self.skip_trailing_comment();
            let end = self.current();
            if !(end.kind == TokenKind::Newline || end.kind == TokenKind::Eof || end.is(";") || end.is("}")) {
                return Err(self.unexpected_token());
            }
        }
        Ok(Some(methods))
    }

    /// Parses `(a, b int, c string)` or `(int, error)`. Grouped names share
    /// the type that follows them.
    fn parse_params(&mut self) -> Result<Vec<Param>, ProtogenError> {
        self.expect("(")?;

        let mut items = Vec::new();
        let mut named_any = false;
        loop {
            self.skip_trivia();
            if self.eat(")") {
                break;
            }

            let variadic = self.eat("...");
            let first = self.parse_type()?;
            let at_item_end = self.current().is(",")
                || self.current().is(")")
                || self.current().kind == TokenKind::Newline;

            if variadic || at_item_end {
                items.push(ParamItem::Bare(if variadic {
                    TypeExpr::Slice(Box::new(first))
                } else {
                    first
                }));
            } else {
                let name = match first {
                    TypeExpr::Named { package: None, name } => name,
                    _ => return Err(self.unexpected_token()),
                };
                let variadic = self.eat("...");
                let type_ = self.parse_type()?;
                let type_ = if variadic { TypeExpr::Slice(Box::new(type_)) } else { type_ };
                items.push(ParamItem::Named(name, type_));
                named_any = true;
            }

            self.skip_trivia();
            if !self.eat(",") {
                self.skip_trivia();
                self.expect(")")?;
                break;
            }
        }

        if !named_any {
            return Ok(items
                .into_iter()
                .map(|item| match item {
                    ParamItem::Bare(type_) | ParamItem::Named(_, type_) => Param { name: None, type_ },
                })
                .collect());
        }

        let mut params = Vec::with_capacity(items.len());
        let mut shared: Option<TypeExpr> = None;
        for item in items.into_iter().rev() {
            match item {
                ParamItem::Named(name, type_) => {
                    shared = Some(type_.clone());
                    params.push(Param { name: Some(name), type_ });
                }
                ParamItem::Bare(TypeExpr::Named { package: None, name }) if shared.is_some() => {
                    let type_ = shared.clone().unwrap_or_else(|| TypeExpr::local(name.clone()));
                    params.push(Param { name: Some(name), type_ });
                }
                ParamItem::Bare(_) => {
                    let tok = self.current();
                    return Err(error(
                        self.file,
                        "Mixed named and unnamed parameters",
                        tok.line,
                        tok.column,
                    ));
                }
            }
        }
        params.reverse();
        Ok(params)
    }

    fn parse_results(&mut self) -> Result<Vec<Param>, ProtogenError> {
        let tok = self.current();
        if tok.is("(") {
            self.parse_params()
        } else if tok.kind == TokenKind::Ident || tok.is("*") || tok.is("[") || tok.is("<-") {
            Ok(vec![Param {
                name:  None,
                type_: self.parse_type()?,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ProtogenError> {
        let tok = self.current().clone();

        if tok.is("*") {
            self.advance();
            return Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)));
        }
        if tok.is("(") {
            self.advance();
            let inner = self.parse_type()?;
            self.expect(")")?;
            return Ok(inner);
        }
        if tok.is("[") {
            self.advance();
            if self.eat("]") {
                return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
            }
            let mut len = String::new();
            while !self.current().is("]") {
                if self.current().kind == TokenKind::Eof {
                    return Err(self.unexpected_token());
                }
                len.push_str(&self.advance().text);
            }
            self.expect("]")?;
            return Ok(TypeExpr::Array {
                len,
                elem: Box::new(self.parse_type()?),
            });
        }
        if tok.is("map") {
            self.advance();
            self.expect("[")?;
            let key = self.parse_type()?;
            self.expect("]")?;
            let value = self.parse_type()?;
            return Ok(TypeExpr::Map {
                key:   Box::new(key),
                value: Box::new(value),
            });
        }
        if ["chan", "<-", "func", "interface", "struct"].iter().any(|k| tok.is(k)) {
            return Ok(TypeExpr::Opaque(self.parse_opaque()?));
        }
        if tok.kind == TokenKind::Ident {
            let start = self.index;
            self.advance();
            let named = if self.current().is(".") && self.peek(1).kind == TokenKind::Ident {
                self.advance();
                let name = self.advance();
                TypeExpr::qualified(tok.text, name.text)
            } else {
                TypeExpr::local(tok.text)
            };
            // An instantiated generic such as `atomic.Pointer[Config]`
            if self.current().is("[") && !self.peek(1).is("]") {
                self.advance();
                self.skip_balanced("[", "]")?;
                return Ok(TypeExpr::Opaque(self.compact_text(start)));
            }
            return Ok(named);
        }

        Err(error(
            self.file,
            &format!("Expected type but found {}", quote(&tok.text)),
            tok.line,
            tok.column,
        ))
    }

    /// Consumes a channel, function, interface or anonymous struct type and
    /// returns its compact source text.
    fn parse_opaque(&mut self) -> Result<String, ProtogenError> {
        let start = self.index;
        if self.eat("<-") {
            self.expect("chan")?;
            self.parse_type()?;
        } else if self.eat("chan") {
            self.eat("<-");
            self.parse_type()?;
        } else if self.eat("func") {
            self.parse_params()?;
            self.parse_results()?;
        } else {
            self.advance();
            self.expect("{")?;
            self.skip_balanced("{", "}")?;
        }
        Ok(self.compact_text(start))
    }

    /// Source text of the tokens from `start` up to the current one, with
    /// spaces only between adjacent words.
    fn compact_text(&self, start: usize) -> String {
        let mut text = String::new();
        let mut previous_word = false;
        for tok in &self.tokens[start..self.index] {
            if matches!(tok.kind, TokenKind::Newline | TokenKind::Comment) {
                continue;
            }
            let word = matches!(tok.kind, TokenKind::Ident | TokenKind::Number);
            if word && previous_word {
                text.push(' ');
            }
            text.push_str(&tok.text);
            previous_word = word;
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_source;

    fn parse(text: &str) -> ParsedFile {
        let tokens = tokenize_source("shop.go", text).expect("tokenize_source failed");
        parse_source("shop.go", &tokens).expect("parse_source failed")
    }

    fn fields(decl: &SourceDeclaration) -> &[FieldDecl] {
        match &decl.kind {
            DeclarationKind::Record(fields) => fields,
            other => panic!("expected a record, got {:?}", other),
        }
    }

    fn methods(decl: &SourceDeclaration) -> &[MethodDecl] {
        match &decl.kind {
            DeclarationKind::Contract(methods) => methods,
            other => panic!("expected a contract, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_struct_with_docs_tags_and_embedding() {
        let file = parse(
            r#"
package shop

import (
    "context"
    "time"
)

// Widget is something we sell.
// It has a name.
type Widget struct {
    // Name is shown to customers.
    Name      string `json:"name" db:"widget_name"`
    Ref       *Widget
    Tags      []string // trailing comments are not docs
    CreatedAt time.Time
    X, Y      int32
    Base
    *pkg.Other
}
"#,
        );

        assert_eq!(file.package, "shop");
        assert_eq!(file.declarations.len(), 1);
        let widget = &file.declarations[0];
        assert_eq!(widget.name, "Widget");
        assert_eq!(widget.docs, "Widget is something we sell.\nIt has a name.");

        let fields = fields(widget);
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[0].name.as_deref(), Some("Name"));
        assert_eq!(fields[0].docs, "Name is shown to customers.");
        assert_eq!(fields[0].metadata.get("db"), Some("widget_name"));
        assert_eq!(fields[1].type_, TypeExpr::Pointer(Box::new(TypeExpr::local("Widget"))));
        assert_eq!(fields[2].type_, TypeExpr::Slice(Box::new(TypeExpr::local("string"))));
        assert_eq!(fields[3].docs, "");
        assert_eq!(fields[3].type_, TypeExpr::qualified("time", "Time"));
        assert_eq!(fields[4].name.as_deref(), Some("X"));
        assert_eq!(fields[5].name.as_deref(), Some("Y"));
        assert_eq!(fields[5].type_, TypeExpr::local("int32"));
        assert_eq!(fields[6].name, None);
        assert_eq!(fields[6].type_, TypeExpr::local("Base"));
        assert_eq!(fields[7].name, None);
        assert_eq!(
            fields[7].type_,
            TypeExpr::Pointer(Box::new(TypeExpr::qualified("pkg", "Other")))
        );
    }

    #[test]
    fn test_parse_interface_methods() {
        let file = parse(
            r#"package shop

type WidgetService interface {
    // Get fetches one widget.
    Get(ctx context.Context, id string) (*Widget, error)
    List(ctx context.Context, offset, limit int) ([]Widget, error)
    Ping()
    Count(context.Context) int
    Watch(ctx context.Context, ids ...string) error
    io.Closer
}
"#,
        );

        let methods = methods(&file.declarations[0]);
        assert_eq!(methods.len(), 6);

        assert_eq!(methods[0].name.as_deref(), Some("Get"));
        assert_eq!(methods[0].docs, "Get fetches one widget.");
        assert_eq!(methods[0].params.len(), 2);
        assert_eq!(methods[0].params[1].name.as_deref(), Some("id"));
        assert_eq!(methods[0].results.len(), 2);
        assert!(methods[0].results[1].type_.is_named(None, "error"));

        assert_eq!(methods[1].params[1].name.as_deref(), Some("offset"));
        assert_eq!(methods[1].params[1].type_, TypeExpr::local("int"));
        assert_eq!(methods[1].params[2].name.as_deref(), Some("limit"));

        assert!(methods[2].params.is_empty());
        assert!(methods[2].results.is_empty());

        assert_eq!(methods[3].params[0].name, None);
        assert_eq!(methods[3].results[0].type_, TypeExpr::local("int"));

        assert_eq!(
            methods[4].params[1].type_,
            TypeExpr::Slice(Box::new(TypeExpr::local("string")))
        );

        assert_eq!(methods[5].name, None);
        assert_eq!(methods[5].embedded, Some(TypeExpr::qualified("io", "Closer")));
    }

    #[test]
    fn test_skips_functions_constants_and_generics() {
        let file = parse(
            r#"package shop

const (
    A = iota
    B
)

var defaults = map[string]int{"a": 1}

func (w *Widget) Describe(opts interface{}) string {
    if w == nil { return "" }
    return w.Name
}

type List[T any] struct {
    Items []T
}

type (
    // Status of an order.
    Status string
    Hash   [32]byte
)
"#,
        );

        let names: Vec<&str> = file.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Status", "Hash"]);
        assert_eq!(file.declarations[0].docs, "Status of an order.");
        assert_eq!(
            file.declarations[0].kind,
            DeclarationKind::Defined(TypeExpr::local("string"))
        );
        assert_eq!(
            file.declarations[1].kind,
            DeclarationKind::Defined(TypeExpr::Array {
                len:  "32".to_string(),
                elem: Box::new(TypeExpr::local("byte")),
            })
        );
    }

    #[test]
    fn test_opaque_and_map_types() {
        let file = parse(
            "package shop\n\ntype Hooks struct {\n    OnDone func(int) error\n    Events chan string\n    Meta map[string]int\n}\n",
        );
        let fields = fields(&file.declarations[0]);
        assert_eq!(fields[0].type_, TypeExpr::Opaque("func(int)error".to_string()));
        assert_eq!(fields[1].type_, TypeExpr::Opaque("chan string".to_string()));
        assert_eq!(
            fields[2].type_,
            TypeExpr::Map {
                key:   Box::new(TypeExpr::local("string")),
                value: Box::new(TypeExpr::local("int")),
            }
        );
    }

    #[test]
    fn test_instantiated_generic_types_are_opaque() {
        let file = parse(
            "package shop\n\ntype Holder struct {\n    Current atomic.Pointer[Config]\n    Pairs   []Pair[string, int]\n    Ready   bool\n}\n",
        );
        let fields = fields(&file.declarations[0]);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].type_, TypeExpr::Opaque("atomic.Pointer[Config]".to_string()));
        assert_eq!(
            fields[1].type_,
            TypeExpr::Slice(Box::new(TypeExpr::Opaque("Pair[string,int]".to_string())))
        );
        assert_eq!(fields[2].type_, TypeExpr::local("bool"));
    }

    #[test]
    fn test_skips_type_set_interfaces() {
        let file = parse(
            "package shop\n\ntype Number interface {\n\t~int | ~float64\n}\n\ntype Key interface {\n\tint | string\n}\n\ntype Widget struct {\n\tName string\n}\n",
        );
        assert_eq!(file.declarations.len(), 1);
        assert_eq!(file.declarations[0].name, "Widget");
    }

    #[test]
    fn test_parse_struct_tag() {
        let metadata = parse_struct_tag("`json:\"user_name,omitempty\" db:\"name\"`");
        assert_eq!(
            metadata.entries,
            vec![
                ("json".to_string(), "user_name,omitempty".to_string()),
                ("db".to_string(), "name".to_string()),
            ]
        );
        assert!(parse_struct_tag("\"\"").is_empty());
    }

    #[test]
    fn test_missing_package_is_an_error() {
        let tokens = tokenize_source("shop.go", "type A struct{}\n").unwrap();
        let err = parse_source("shop.go", &tokens).unwrap_err();
        assert!(matches!(err, ProtogenError::ParseError { .. }));
    }

    #[test]
    fn test_unexpected_token_reports_position() {
        let tokens = tokenize_source("shop.go", "package shop\n\ntype A struct {\n    B int 7\n}\n").unwrap();
        match parse_source("shop.go", &tokens) {
            Err(ProtogenError::ParseError { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
