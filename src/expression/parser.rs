//! Recursive descent parser: text → [`ClassExpression`].
//!
//! Precedence, loosest first: `or`, `and`, then the prefix/infix forms
//! `not X` and `R some X` / `R only X`, whose operand is a single primary.
//! So `r some A and B` reads as `(r some A) and B`.
//!
//! Leaves are resolved through a [`LeafResolver`]; the first leaf that fails to
//! resolve aborts the parse. The parser never mutates anything.

use super::ClassExpression;
use super::lexer::{self, Keyword, Token, TokenKind};
use crate::entity::Iri;
use crate::error::ExpressionError;

/// Result type for expression parsing.
pub type ExpressionResult<T> = std::result::Result<T, ExpressionError>;

/// Turns leaf tokens into entity references.
pub trait LeafResolver {
    /// Resolve a token standing where a class is expected.
    ///
    /// May return a compound expression (e.g. a disjunction for an ambiguous
    /// label).
    fn resolve_class(&self, token: &Token, input: &str) -> ExpressionResult<ClassExpression>;

    /// Resolve a token standing where an object property is expected.
    fn resolve_property(&self, token: &Token, input: &str) -> ExpressionResult<Iri>;
}

/// Parse `input` into a fully resolved class expression.
pub fn parse(input: &str, resolver: &(impl LeafResolver + ?Sized)) -> ExpressionResult<ClassExpression> {
    let tokens = lexer::tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        input,
        resolver,
    };
    let expr = parser.parse_union()?;
    if let Some(extra) = parser.peek() {
        return Err(parser.syntax(format!(
            "unexpected \"{}\" at byte {}",
            extra.text, extra.span.start
        )));
    }
    Ok(expr)
}

struct Parser<'a, R: LeafResolver + ?Sized> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
    resolver: &'a R,
}

impl<'a, R: LeafResolver + ?Sized> Parser<'a, R> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        self.peek().and_then(Token::keyword)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn syntax(&self, message: String) -> ExpressionError {
        ExpressionError::Syntax {
            message,
            input: self.input.to_string(),
        }
    }

    fn parse_union(&mut self) -> ExpressionResult<ClassExpression> {
        let mut operands = vec![self.parse_intersection()?];
        while self.peek_keyword() == Some(Keyword::Or) {
            self.advance();
            operands.push(self.parse_intersection()?);
        }
        Ok(ClassExpression::or(operands))
    }

    fn parse_intersection(&mut self) -> ExpressionResult<ClassExpression> {
        let mut operands = vec![self.parse_primary()?];
        while self.peek_keyword() == Some(Keyword::And) {
            self.advance();
            operands.push(self.parse_primary()?);
        }
        Ok(ClassExpression::and(operands))
    }

    fn parse_primary(&mut self) -> ExpressionResult<ClassExpression> {
        let Some(token) = self.advance() else {
            return Err(self.syntax("unexpected end of expression".into()));
        };

        match (token.kind, token.keyword()) {
            (TokenKind::Word, Some(Keyword::Not)) => {
                let operand = self.parse_primary()?;
                Ok(ClassExpression::not(operand))
            }
            (TokenKind::Word, Some(kw)) => Err(self.syntax(format!(
                "unexpected keyword \"{}\" ({kw:?}) at byte {}",
                token.text, token.span.start
            ))),
            (TokenKind::Open, _) => {
                let inner = self.parse_union()?;
                match self.advance() {
                    Some(t) if t.kind == TokenKind::Close => Ok(inner),
                    Some(t) => Err(self.syntax(format!(
                        "expected ')' but found \"{}\" at byte {}",
                        t.text, t.span.start
                    ))),
                    None => Err(self.syntax("unbalanced parentheses: missing ')'".into())),
                }
            }
            (TokenKind::Close, _) => Err(self.syntax(format!(
                "unbalanced parentheses: unexpected ')' at byte {}",
                token.span.start
            ))),
            (TokenKind::Word | TokenKind::Quoted, _) => match self.peek_keyword() {
                Some(kw @ (Keyword::Some | Keyword::Only)) => {
                    let property = self.resolver.resolve_property(&token, self.input)?;
                    self.advance();
                    let filler = self.parse_primary()?;
                    Ok(match kw {
                        Keyword::Some => ClassExpression::exists(property, filler),
                        _ => ClassExpression::for_all(property, filler),
                    })
                }
                _ => self.resolver.resolve_class(&token, self.input),
            },
        }
    }
}
