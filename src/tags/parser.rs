//! Recursive-descent parser producing a boolean tree over tag names.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and ('|' and)*
//! and     := unary ('&' unary)*
//! unary   := '!' unary | primary
//! primary := TAG | '(' or ')'
//! ```

use super::lexer::Token;

/// Parsed tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate against a presence predicate for operand names.
    pub fn eval(&self, present: &impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(name) => present(name),
            Self::Not(inner) => !inner.eval(present),
            Self::And(lhs, rhs) => lhs.eval(present) && rhs.eval(present),
            Self::Or(lhs, rhs) => lhs.eval(present) || rhs.eval(present),
        }
    }
}

/// Parse a token stream. The returned error is a short reason; the caller
/// attaches the raw expression text.
pub fn parse(tokens: &[Token]) -> Result<Expr, String> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(Token::Close) => Err("missing parentheses".to_string()),
        Some(other) => Err(format!("missing logical operator before '{other}'")),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            let inner = self.unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.bump() {
            Some(Token::Tag(name)) => Ok(Expr::Tag(name.clone())),
            Some(Token::Open) => {
                let inner = self.or()?;
                match self.bump() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err("missing parentheses".to_string()),
                }
            }
            Some(other) => Err(format!("expected a tag name, found '{other}'")),
            None => Err("expected a tag name at end of expression".to_string()),
        }
    }
}
