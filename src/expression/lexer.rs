//! Tokenizer for textual class expressions.
//!
//! Splits on whitespace, emits `(` and `)` as their own tokens, and keeps a
//! single-quoted segment (`'pouet pouet'`) together as one literal token so
//! multi-word labels can be used as leaf references. Quoted tokens are never
//! keywords.

use crate::error::ExpressionError;

/// Byte-level source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word: a name, IRI, `prefix:local`, or keyword.
    Word,
    /// A single-quoted literal; `text` holds the content without quotes.
    Quoted,
    Open,
    Close,
}

/// Reserved words of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Some,
    Only,
    And,
    Or,
    Not,
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Token text (quotes stripped for [`TokenKind::Quoted`]).
    pub text: String,
    pub span: Span,
}

impl Token {
    /// The keyword this token spells, if any. Matching is case-insensitive.
    pub fn keyword(&self) -> Option<Keyword> {
        if self.kind != TokenKind::Word {
            return None;
        }
        match self.text.to_ascii_lowercase().as_str() {
            "some" => Some(Keyword::Some),
            "only" => Some(Keyword::Only),
            "and" => Some(Keyword::And),
            "or" => Some(Keyword::Or),
            "not" => Some(Keyword::Not),
            _ => None,
        }
    }

    /// Whether the token can name an entity (a non-keyword word or a literal).
    pub fn is_reference(&self) -> bool {
        match self.kind {
            TokenKind::Word => self.keyword().is_none(),
            TokenKind::Quoted => true,
            TokenKind::Open | TokenKind::Close => false,
        }
    }
}

/// Tokenize an expression string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '(' | ')' => {
                chars.next();
                tokens.push(Token {
                    kind: if c == '(' { TokenKind::Open } else { TokenKind::Close },
                    text: c.to_string(),
                    span: Span {
                        start,
                        end: start + 1,
                    },
                });
            }
            '\'' => {
                chars.next();
                let content_start = start + 1;
                let mut end = None;
                for (i, ch) in chars.by_ref() {
                    if ch == '\'' {
                        end = Some(i);
                        break;
                    }
                }
                let Some(end) = end else {
                    return Err(ExpressionError::Syntax {
                        message: format!("unterminated quote starting at byte {start}"),
                        input: input.to_string(),
                    });
                };
                tokens.push(Token {
                    kind: TokenKind::Quoted,
                    text: input[content_start..end].to_string(),
                    span: Span {
                        start,
                        end: end + 1,
                    },
                });
            }
            _ => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '\'' {
                        break;
                    }
                    end = i + ch.len_utf8();
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Word,
                    text: input[start..end].to_string(),
                    span: Span { start, end },
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn whitespace_split() {
        let tokens = tokenize("part-of some Animal").unwrap();
        assert_eq!(texts(&tokens), vec!["part-of", "some", "Animal"]);
        assert_eq!(tokens[1].keyword(), Some(Keyword::Some));
        assert!(tokens[0].is_reference());
    }

    #[test]
    fn quoted_segment_is_one_token() {
        let tokens = tokenize("part-of some 'pouet pouet'").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::Quoted);
        assert_eq!(tokens[2].text, "pouet pouet");
        assert_eq!(tokens[2].span, Span { start: 13, end: 26 });
    }

    #[test]
    fn quoted_keyword_is_not_a_keyword() {
        let tokens = tokenize("'and'").unwrap();
        assert!(tokens[0].keyword().is_none());
        assert!(tokens[0].is_reference());
    }

    #[test]
    fn parentheses_split_words() {
        let tokens = tokenize("(A or B)and C").unwrap();
        assert_eq!(texts(&tokens), vec!["(", "A", "or", "B", ")", "and", "C"]);
        assert_eq!(tokens[0].kind, TokenKind::Open);
        assert_eq!(tokens[4].kind, TokenKind::Close);
    }

    #[test]
    fn unterminated_quote_is_syntax_error() {
        let err = tokenize("part-of some 'Animal").unwrap_err();
        assert!(matches!(err, ExpressionError::Syntax { .. }));
    }

    #[test]
    fn keywords_case_insensitive() {
        let tokens = tokenize("A AND B").unwrap();
        assert_eq!(tokens[1].keyword(), Some(Keyword::And));
    }
}
