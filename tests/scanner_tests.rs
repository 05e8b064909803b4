// ABOUTME: Black-box scanner property tests exercised through the public library API

use thanatos::scanner::Scanner;
use thanatos::token::TokenType;

#[test]
fn round_trip_over_a_realistic_program_ignores_comments_and_whitespace() {
    let src = "\
class Greeter {
  construct(name) { // remember the name
    this.name = name;
  }

  hello() {
    print \"hi\" + this.name;
  }
}

let g = Greeter(\"Ada\");
g.hello();
";
    let (tokens, errors) = Scanner::new(src).scan_tokens();
    assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);

    let joined: String = tokens
        .iter()
        .filter(|t| t.kind != TokenType::Eof)
        .map(|t| t.lexeme.clone())
        .collect();

    let without_comments_and_ws: String = src
        .lines()
        .map(|line| match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    assert_eq!(joined, without_comments_and_ws);
}

#[test]
fn every_keyword_in_the_table_is_recognised() {
    let src = "and class else false for function if let or print return super this true void while";
    let (tokens, errors) = Scanner::new(src).scan_tokens();
    assert!(errors.is_empty());

    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenType::And,
            TokenType::Class,
            TokenType::Else,
            TokenType::False,
            TokenType::For,
            TokenType::Function,
            TokenType::If,
            TokenType::Let,
            TokenType::Or,
            TokenType::Print,
            TokenType::Return,
            TokenType::Super,
            TokenType::This,
            TokenType::True,
            TokenType::Void,
            TokenType::While,
            TokenType::Eof,
        ]
    );
}
