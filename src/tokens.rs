use regex::Regex;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Token<'a> {
    OpenRoundBracket,
    CloseRoundBracket,
    PlainChars(&'a str),
}

fn create_token(captured: &str) -> Token {
    match captured {
        "(" => Token::OpenRoundBracket,
        ")" => Token::CloseRoundBracket,
        _ => Token::PlainChars(captured),
    }
}

/// Split a line into parens and whitespace-separated runs of everything else.
/// Newlines count as whitespace, so multi-line input collapses into one
/// token stream. Never fails; blank input gives no tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(
            r#"(?x)              # ignore whitespace in this pattern & allow comments
                [()]             # a single paren
                |[^\s()]+        # or one or more plain characters
            "#
        )
        .unwrap();
    }
    TOKEN_RE
        .find_iter(input)
        .map(|m| create_token(m.as_str()))
        .collect()
}
