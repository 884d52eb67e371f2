//! Normalization and tokenization of tag expressions.

use std::fmt;

/// One lexical unit of a tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A tag name, already whitespace-stripped and literal-escaped.
    Tag(String),
    And,
    Or,
    Not,
    Open,
    Close,
}

impl Token {
    const fn from_operator(c: char) -> Option<Self> {
        match c {
            '&' => Some(Self::And),
            '|' => Some(Self::Or),
            '!' => Some(Self::Not),
            '(' => Some(Self::Open),
            ')' => Some(Self::Close),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(name) => f.write_str(name),
            Self::And => f.write_str("&"),
            Self::Or => f.write_str("|"),
            Self::Not => f.write_str("!"),
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
        }
    }
}

/// Spellings a boolean parser would accept as a literal.
const BOOL_LITERALS: &[&str] = &[
    "1", "t", "T", "TRUE", "true", "True", "0", "f", "F", "FALSE", "false", "False",
];

/// Wrap boolean look-alike names in braces so they stay tag names.
#[must_use]
pub fn escape_literal(name: String) -> String {
    if BOOL_LITERALS.contains(&name.as_str()) {
        format!("{{{name}}}")
    } else {
        name
    }
}

/// Normalize a tag name the same way expression operands are normalized.
#[must_use]
pub fn normalize_tag(name: &str) -> String {
    escape_literal(name.chars().filter(|c| !c.is_whitespace()).collect())
}

/// Strip whitespace, turn `,` into `&` and collapse `&&`/`||` runs.
#[must_use]
pub fn normalize_expression(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().filter(|c| !c.is_whitespace()) {
        let c = if c == ',' { '&' } else { c };
        if (c == '&' || c == '|') && out.ends_with(c) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Split a normalized expression into tokens plus its distinct operands in
/// first-seen order.
#[must_use]
pub fn tokenize(normalized: &str) -> (Vec<Token>, Vec<String>) {
    let mut tokens = Vec::new();
    let mut operands: Vec<String> = Vec::new();
    let mut word = String::new();

    let mut flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if word.is_empty() {
            return;
        }
        let name = escape_literal(std::mem::take(word));
        if !operands.contains(&name) {
            operands.push(name.clone());
        }
        tokens.push(Token::Tag(name));
    };

    for c in normalized.chars() {
        if let Some(op) = Token::from_operator(c) {
            flush(&mut word, &mut tokens);
            tokens.push(op);
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut tokens);

    (tokens, operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Token {
        Token::Tag(name.to_string())
    }

    #[test]
    fn normalize_collapses_aliases() {
        assert_eq!(normalize_expression("a && b || c | b & b"), "a&b|c|b&b");
        assert_eq!(normalize_expression("tag 1 , tag3"), "tag1&tag3");
        assert_eq!(normalize_expression("a &&& b"), "a&b");
        assert_eq!(normalize_expression("  "), "");
    }

    #[test]
    fn tokenize_splits_operators_and_operands() {
        let (tokens, operands) = tokenize(&normalize_expression("b || c | b & b && a"));
        assert_eq!(
            tokens,
            vec![
                tag("b"),
                Token::Or,
                tag("c"),
                Token::Or,
                tag("b"),
                Token::And,
                tag("b"),
                Token::And,
                tag("a"),
            ]
        );
        assert_eq!(operands, vec!["b", "c", "a"]);
    }

    #[test]
    fn tokenize_escapes_boolean_lookalikes() {
        let (tokens, operands) = tokenize("!(true&False)");
        assert_eq!(
            tokens,
            vec![
                Token::Not,
                Token::Open,
                tag("{true}"),
                Token::And,
                tag("{False}"),
                Token::Close,
            ]
        );
        assert_eq!(operands, vec!["{true}", "{False}"]);
    }

    #[test]
    fn normalize_tag_matches_operand_form() {
        assert_eq!(normalize_tag("foo bar"), "foobar");
        assert_eq!(normalize_tag("true"), "{true}");
        assert_eq!(normalize_tag(" t "), "{t}");
        assert_eq!(normalize_tag("truth"), "truth");
    }

    #[test]
    fn tokens_display_round_trip_text() {
        let (tokens, _) = tokenize("!(a|b)&c");
        let text: String = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(text, "!(a|b)&c");
    }
}
