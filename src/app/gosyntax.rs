//! Just enough Go to canonicalize a generated import file: a package clause
//! followed by single-spec import declarations.

use crate::app::error::{Error, Result};
use std::fmt;

const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

const ILLEGAL_IMPORT_CHARS: &str = "!\"#$%&'()*,:;<=>?[\\]^{|}`\u{FFFD}";

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Import paths as the Go parser accepts them.
pub fn is_valid_import_path(path: &str) -> bool {
    !path.is_empty()
        && path.chars().all(|c| {
            !c.is_control() && !c.is_whitespace() && !ILLEGAL_IMPORT_CHARS.contains(c)
        })
}

fn syntax_error(line: usize, column: usize, message: impl Into<String>) -> Error {
    Error::Syntax {
        line,
        column,
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Period,
    Semicolon,
    Newline,
    Str { literal: String, value: String },
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{}'", name),
            Token::Period => f.write_str("'.'"),
            Token::Semicolon => f.write_str("';'"),
            Token::Newline => f.write_str("newline"),
            Token::Str { literal, .. } => f.write_str(literal),
            Token::Eof => f.write_str("EOF"),
        }
    }
}

#[derive(Debug)]
struct Spanned {
    token: Token,
    line: usize,
    column: usize,
}

impl Spanned {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.token, Token::Ident(name) if name == keyword)
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Result<Spanned> {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }

        let (line, column) = (self.line, self.column);
        let token = match self.peek() {
            None => Token::Eof,
            Some('\n') => {
                self.bump();
                Token::Newline
            }
            Some(';') => {
                self.bump();
                Token::Semicolon
            }
            Some('.') => {
                self.bump();
                Token::Period
            }
            Some('"') => self.interpreted_string(line, column)?,
            Some('`') => self.raw_string(line, column)?,
            Some(c) if is_letter(c) => {
                let mut ident = String::new();
                while let Some(c) = self.peek().filter(|&c| is_letter(c) || c.is_numeric()) {
                    ident.push(c);
                    self.bump();
                }
                Token::Ident(ident)
            }
            Some(c) => {
                return Err(syntax_error(
                    line,
                    column,
                    format!("illegal character U+{:04X} '{}'", c as u32, c),
                ))
            }
        };

        Ok(Spanned {
            token,
            line,
            column,
        })
    }

    fn interpreted_string(&mut self, line: usize, column: usize) -> Result<Token> {
        self.bump();
        let mut literal = String::from('"');
        let mut value = String::new();

        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(syntax_error(line, column, "string literal not terminated"))
                }
                Some('"') => break,
                Some('\\') => {
                    literal.push('\\');
                    self.escape(&mut literal, &mut value)?;
                }
                Some(c) => {
                    literal.push(c);
                    value.push(c);
                }
            }
        }

        literal.push('"');
        Ok(Token::Str { literal, value })
    }

    fn escape(&mut self, literal: &mut String, value: &mut String) -> Result<()> {
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Err(syntax_error(line, column, "escape sequence not terminated"));
        };

        let simple = match c {
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            '\\' | '"' => Some(c),
            _ => None,
        };
        if let Some(decoded) = simple {
            self.bump();
            literal.push(c);
            value.push(decoded);
            return Ok(());
        }

        let (digits, radix) = match c {
            '0'..='7' => (3, 8),
            'x' => (2, 16),
            'u' => (4, 16),
            'U' => (8, 16),
            _ => return Err(syntax_error(line, column, "unknown escape sequence")),
        };
        if radix == 16 {
            self.bump();
            literal.push(c);
        }

        let mut code: u32 = 0;
        for _ in 0..digits {
            let digit = self.peek().and_then(|d| d.to_digit(radix));
            match (digit, self.bump()) {
                (Some(d), Some(raw)) => {
                    literal.push(raw);
                    code = code * radix + d;
                }
                _ => {
                    return Err(syntax_error(
                        self.line,
                        self.column,
                        "illegal character in escape sequence",
                    ))
                }
            }
        }

        if radix == 8 && code > 255 {
            return Err(syntax_error(line, column, "octal escape value > 255"));
        }
        let decoded = char::from_u32(code).ok_or_else(|| {
            syntax_error(line, column, "escape sequence is invalid Unicode code point")
        })?;
        value.push(decoded);
        Ok(())
    }

    fn raw_string(&mut self, line: usize, column: usize) -> Result<Token> {
        self.bump();
        let mut value = String::new();

        loop {
            match self.bump() {
                None => {
                    return Err(syntax_error(
                        line,
                        column,
                        "raw string literal not terminated",
                    ))
                }
                Some('`') => break,
                Some('\r') => {}
                Some(c) => value.push(c),
            }
        }

        Ok(Token::Str {
            literal: format!("`{}`", value),
            value,
        })
    }
}

/// A parsed import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    pub imports: Vec<ImportSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// `_`, `.`, or an identifier.
    pub name: Option<String>,
    /// The path literal exactly as written, quotes included.
    pub literal: String,
    /// Whether a blank line preceded this declaration.
    pub spaced: bool,
}

pub fn parse_file(src: &str) -> Result<SourceFile> {
    Parser::new(src)?.file()
}

struct Parser {
    lexer: Lexer,
    current: Spanned,
}

impl Parser {
    fn new(src: &str) -> Result<Self> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<Spanned> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(syntax_error(
            self.current.line,
            self.current.column,
            message,
        ))
    }

    fn skip_newlines(&mut self) -> Result<usize> {
        let mut count = 0;
        while self.current.token == Token::Newline {
            self.advance()?;
            count += 1;
        }
        Ok(count)
    }

    fn end_of_statement(&mut self) -> Result<()> {
        match self.current.token {
            Token::Eof => Ok(()),
            Token::Newline => self.advance().map(|_| ()),
            Token::Semicolon => {
                self.advance()?;
                if self.current.token == Token::Newline {
                    self.advance()?;
                }
                Ok(())
            }
            _ => self.error(format!("expected ';', found {}", self.current.token)),
        }
    }

    fn file(mut self) -> Result<SourceFile> {
        self.skip_newlines()?;
        if !self.current.is_keyword("package") {
            return self.error(format!("expected 'package', found {}", self.current.token));
        }
        self.advance()?;

        let package = match &self.current.token {
            Token::Ident(name) if name == "_" => return self.error("invalid package name _"),
            Token::Ident(name) if !is_keyword(name) => name.clone(),
            other => return self.error(format!("expected 'IDENT', found {}", other)),
        };
        self.advance()?;
        self.end_of_statement()?;

        let mut imports = Vec::new();
        loop {
            let blank_lines = self.skip_newlines()?;
            if self.current.token == Token::Eof {
                break;
            }
            if !self.current.is_keyword("import") {
                return self.error(format!("expected 'import', found {}", self.current.token));
            }
            self.advance()?;

            let name = match &self.current.token {
                Token::Period => Some(".".to_string()),
                Token::Ident(name) if !is_keyword(name) => Some(name.clone()),
                _ => None,
            };
            if name.is_some() {
                self.advance()?;
            }

            let literal = match &self.current.token {
                Token::Str { literal, value } if is_valid_import_path(value) => literal.clone(),
                Token::Str { literal, .. } => {
                    return self.error(format!("invalid import path: {}", literal))
                }
                other => return self.error(format!("missing import path; found {}", other)),
            };
            self.advance()?;
            self.end_of_statement()?;

            imports.push(ImportSpec {
                name,
                literal,
                spaced: blank_lines > 0,
            });
        }

        Ok(SourceFile { package, imports })
    }
}

impl SourceFile {
    /// Prints the file in gofmt layout.
    pub fn print(&self) -> String {
        let mut out = format!("package {}\n", self.package);

        for (i, spec) in self.imports.iter().enumerate() {
            if i == 0 || spec.spaced {
                out.push('\n');
            }
            out.push_str("import ");
            if let Some(name) = &spec.name {
                out.push_str(name);
                out.push(' ');
            }
            out.push_str(&spec.literal);
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_message(src: &str) -> String {
        match parse_file(src) {
            Err(Error::Syntax {
                line,
                column,
                message,
            }) => format!("{}:{}: {}", line, column, message),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn parses_blank_and_named_imports() {
        let file = parse_file(
            "package plugins\nimport _ \"a/b\"\nimport . `c`\nimport x \"d\"\n",
        )
        .unwrap();

        assert_eq!(file.package, "plugins");
        let names: Vec<_> = file.imports.iter().map(|s| s.name.as_deref()).collect();
        assert_eq!(names, vec![Some("_"), Some("."), Some("x")]);
        assert_eq!(file.imports[1].literal, "`c`");
    }

    #[test]
    fn prints_gofmt_layout() {
        let file =
            parse_file("\n  package   p\t\nimport   _    \"a\"\n\n\n\nimport _ \"b\";\nimport \"c\"")
                .unwrap();

        assert_eq!(
            file.print(),
            "package p\n\nimport _ \"a\"\n\nimport _ \"b\"\nimport \"c\"\n"
        );
    }

    #[test]
    fn package_only() {
        let file = parse_file("package p\n").unwrap();
        assert!(file.imports.is_empty());
        assert_eq!(file.print(), "package p\n");
    }

    #[test]
    fn rejects_bad_package_names() {
        assert_eq!(syntax_message("package _\n"), "1:9: invalid package name _");
        assert_eq!(
            syntax_message("package func\n"),
            "1:9: expected 'IDENT', found 'func'"
        );
        assert_eq!(syntax_message("package \n"), "1:9: expected 'IDENT', found newline");
        assert_eq!(
            syntax_message("package 9lives\n"),
            "1:9: illegal character U+0039 '9'"
        );
    }

    #[test]
    fn rejects_missing_package_clause() {
        assert_eq!(
            syntax_message("import _ \"a\"\n"),
            "1:1: expected 'package', found 'import'"
        );
    }

    #[test]
    fn rejects_unterminated_literals() {
        assert_eq!(
            syntax_message("package p\nimport _ \"a\n"),
            "2:10: string literal not terminated"
        );
        assert_eq!(
            syntax_message("package p\nimport _ `a\n"),
            "2:10: raw string literal not terminated"
        );
    }

    #[test]
    fn rejects_invalid_import_paths() {
        assert_eq!(
            syntax_message("package p\nimport _ \"my plugin\"\n"),
            "2:10: invalid import path: \"my plugin\""
        );
        assert_eq!(
            syntax_message("package p\nimport _ \"\"\n"),
            "2:10: invalid import path: \"\""
        );
        // A quote inside a directory name ends the literal early.
        assert_eq!(
            syntax_message("package p\nimport _ \"a\"b\"\n"),
            "2:13: expected ';', found 'b'"
        );
    }

    #[test]
    fn decodes_escapes_before_validating() {
        assert!(parse_file("package p\nimport _ \"a\\x2fb\"\n").is_ok());
        assert_eq!(
            syntax_message("package p\nimport _ \"a\\x20b\"\n"),
            "2:10: invalid import path: \"a\\x20b\""
        );
        assert_eq!(
            syntax_message("package p\nimport _ \"a\\qb\"\n"),
            "2:13: unknown escape sequence"
        );
    }

    #[test]
    fn rejects_other_declarations() {
        assert_eq!(
            syntax_message("package p\nfunc main() {}\n"),
            "2:1: expected 'import', found 'func'"
        );
    }

    #[test]
    fn import_path_rules() {
        assert!(is_valid_import_path("github.com/acme/plugins/zip"));
        assert!(is_valid_import_path("example.com/ünïcode"));
        assert!(!is_valid_import_path(""));
        assert!(!is_valid_import_path("a b"));
        assert!(!is_valid_import_path("a:b"));
        assert!(!is_valid_import_path("a\u{FFFD}"));
    }
}
