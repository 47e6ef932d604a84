//! Tokenizer for the supported SQL subset

use std::fmt;

use super::errors::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword; keywords are matched case-insensitively by the parser
    Ident(String),
    /// Numeric-looking literal, kept verbatim
    Number(String),
    /// Single-quoted string literal, unescaped
    Str(String),
    Comma,
    Dot,
    Eq,
    Star,
    Semicolon,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "'{}'", s),
            TokenKind::Number(s) => write!(f, "number {}", s),
            TokenKind::Str(s) => write!(f, "string '{}'", s),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub offset: usize,
}

/// Splits `input` into tokens, always ending with `Eof`
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let single = match c {
            ',' => Some(TokenKind::Comma),
            '.' => Some(TokenKind::Dot),
            '=' => Some(TokenKind::Eq),
            '*' => Some(TokenKind::Star),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(Token { kind, offset });
            i += 1;
            continue;
        }

        if c == '\'' {
            let (value, next) = lex_string(&chars, i)?;
            tokens.push(Token {
                kind: TokenKind::Str(value),
                offset,
            });
            i = next;
            continue;
        }

        let signed_number = (c == '-' || c == '+')
            && chars.get(i + 1).map_or(false, |(_, n)| n.is_ascii_digit());
        if c.is_ascii_digit() || signed_number {
            let start = i;
            i += 1;
            while i < chars.len() {
                let ch = chars[i].1;
                let exponent_sign =
                    (ch == '-' || ch == '+') && matches!(chars[i - 1].1, 'e' | 'E');
                if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || exponent_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Number(collect(&chars[start..i])),
                offset,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].1.is_alphanumeric() || chars[i].1 == '_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(collect(&chars[start..i])),
                offset,
            });
            continue;
        }

        return Err(ParseError::unexpected_character(c, offset));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}

/// Lexes a quoted string starting at `start`; `''` is an escaped quote
fn lex_string(chars: &[(usize, char)], start: usize) -> ParseResult<(String, usize)> {
    let mut value = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i].1 {
            '\'' if chars.get(i + 1).map(|(_, c)| *c) == Some('\'') => {
                value.push('\'');
                i += 2;
            }
            '\'' => return Ok((value, i + 1)),
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    Err(ParseError::unterminated_string(chars[start].0))
}

fn collect(chars: &[(usize, char)]) -> String {
    chars.iter().map(|(_, c)| *c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_select() {
        assert_eq!(
            kinds("SELECT p.price FROM Product p;"),
            vec![
                TokenKind::Ident("SELECT".into()),
                TokenKind::Ident("p".into()),
                TokenKind::Dot,
                TokenKind::Ident("price".into()),
                TokenKind::Ident("FROM".into()),
                TokenKind::Ident("Product".into()),
                TokenKind::Ident("p".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_literals() {
        assert_eq!(
            kinds("x = 'it''s' AND y = -12 AND z = 1.5e-3"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Eq,
                TokenKind::Str("it's".into()),
                TokenKind::Ident("AND".into()),
                TokenKind::Ident("y".into()),
                TokenKind::Eq,
                TokenKind::Number("-12".into()),
                TokenKind::Ident("AND".into()),
                TokenKind::Ident("z".into()),
                TokenKind::Eq,
                TokenKind::Number("1.5e-3".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("SELECT  a").unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 8);
        assert_eq!(tokens[2].offset, 9);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("WHERE a = 'oops").unwrap_err();
        assert_eq!(err.offset(), Some(10));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a > 3").unwrap_err();
        assert!(err.message().contains('>'));
        assert_eq!(err.offset(), Some(2));
    }
}
