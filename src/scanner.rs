// ABOUTME: Scanner module converting source text into a token stream

use crate::error::LexError;
use crate::token::{keyword, Literal, Token, TokenType};

pub struct Scanner {
    chars: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scans the whole source, returning the token stream (always ending in
    /// EOF) and any lexical errors encountered along the way. Scanning never
    /// aborts early: an unexpected character is reported and scanning resumes
    /// with the next character, per spec.md §4.1.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<LexError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(TokenType::Eof, "", None, self.line));
        (self.tokens, self.errors)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        *self.chars.get(self.current).unwrap_or(&'\0')
    }

    fn peek_next(&self) -> char {
        *self.chars.get(self.current + 1).unwrap_or(&'\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenType) {
        self.add_token_literal(kind, None);
    }

    fn add_token_literal(&mut self, kind: TokenType, literal: Option<Literal>) {
        let lexeme = self.lexeme();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(LexError {
            line: self.line,
            message: message.into(),
        });
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),
            '!' => {
                let kind = if self.matches('=') { TokenType::BangEqual } else { TokenType::Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { TokenType::EqualEqual } else { TokenType::Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { TokenType::LessEqual } else { TokenType::Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') { TokenType::GreaterEqual } else { TokenType::Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            ' ' | '\t' | '\r' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_identifier_start(c) => self.identifier(),
            other => self.error(format!("Unexpected character {}.", other)),
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.error("Unterminated string.");
            return;
        }

        // consume closing quote
        self.advance();

        let value: String = self.chars[self.start + 1..self.current - 1].iter().collect();
        self.add_token_literal(TokenType::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        let value: f64 = text.parse().expect("scanner only admits valid number lexemes");
        self.add_token_literal(TokenType::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text = self.lexeme();
        let kind = keyword(&text).unwrap_or(TokenType::Identifier);
        self.add_token(kind);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<Token> {
        let (tokens, errors) = Scanner::new(src).scan_tokens();
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens
    }

    #[test]
    fn scans_single_and_double_char_punctuation() {
        let tokens = scan("!= == <= >= < > = ! + - * /");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::BangEqual,
                TokenType::EqualEqual,
                TokenType::LessEqual,
                TokenType::GreaterEqual,
                TokenType::Less,
                TokenType::Greater,
                TokenType::Equal,
                TokenType::Bang,
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Star,
                TokenType::Slash,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_consumed_to_newline() {
        let tokens = scan("1 // comment\n2");
        assert_eq!(tokens[0].kind, TokenType::Number);
        assert_eq!(tokens[1].kind, TokenType::Number);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn string_with_embedded_newline_tracks_line() {
        let tokens = scan("\"a\nb\" 1");
        assert_eq!(tokens[0].kind, TokenType::String);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_an_error_with_no_token() {
        let (tokens, errors) = Scanner::new("\"abc").scan_tokens();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unterminated string.");
        // Only EOF is emitted; no STRING token for the unterminated literal.
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenType::Eof);
    }

    #[test]
    fn numbers_always_store_as_float() {
        let tokens = scan("42 3.5");
        assert_eq!(tokens[0].literal, Some(Literal::Number(42.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.5)));
    }

    #[test]
    fn keywords_recognised_identifiers_are_not() {
        let tokens = scan("class construct and fooBar");
        assert_eq!(tokens[0].kind, TokenType::Class);
        assert_eq!(tokens[1].kind, TokenType::Identifier);
        assert_eq!(tokens[2].kind, TokenType::And);
        assert_eq!(tokens[3].kind, TokenType::Identifier);
    }

    #[test]
    fn unexpected_character_reports_and_continues() {
        let (tokens, errors) = Scanner::new("1 @ 2").scan_tokens();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unexpected character @.");
        // scanning continues: both numbers plus EOF are still produced
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn scanner_round_trip_matches_source_without_comments_and_whitespace() {
        let src = "let a = 1; // trailing comment\nprint a + 2;";
        let tokens = scan(src);
        let joined: String = tokens
            .iter()
            .filter(|t| t.kind != TokenType::Eof)
            .map(|t| t.lexeme.clone())
            .collect::<Vec<_>>()
            .join("");
        assert_eq!(joined, "leta=1;printa+2;");
    }
}
