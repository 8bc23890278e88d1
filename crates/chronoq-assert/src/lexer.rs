//! Lexer for the `assert-*` statement grammar (spec §4.A).

use logos::Logos;

/// Tokens of a single assertion statement, after the statement terminator
/// (`;`) has already been stripped by the preprocessor.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("assert-ent")]
    AssertEnt,

    #[token("assert-sup")]
    AssertSup,

    #[token("assert-eq")]
    AssertEq,

    #[token("assert-span")]
    AssertSpan,

    #[token(",")]
    Comma,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
}

/// Tokenize `source`, discarding lexer errors by bubbling them as `None`
/// tokens the caller rejects with a `Malformed` parse error.
pub fn tokenize(source: &str) -> Vec<Option<Token>> {
    Token::lexer(source).map(|r| r.ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keyword_and_targets() {
        let toks = tokenize("assert-ent q[0], q[1]");
        assert_eq!(toks[0], Some(Token::AssertEnt));
        assert!(toks.iter().any(|t| matches!(t, Some(Token::LBracket))));
    }

    #[test]
    fn lexes_threshold_float() {
        let toks = tokenize("assert-eq 0.999 q[0]");
        assert_eq!(toks[1], Some(Token::FloatLiteral(0.999)));
    }
}
