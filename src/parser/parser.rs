//! Recursive-descent parser for the supported SQL subset
//!
//! ```text
//! query   := SELECT fields FROM coll [alias]
//!            [JOIN coll [alias] ON path = path]
//!            [WHERE cond (AND cond)*]
//!            [GROUP BY path (, path)*] [;]
//! fields  := '*' | path (, path)*
//! path    := ident (. ident)*
//! cond    := path = value
//! value   := 'string' | number | path
//! ```

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use super::ast::{FilterPredicate, JoinPredicate, ParsedQuery};
use super::errors::{ParseError, ParseResult};
use super::lexer::{tokenize, Token, TokenKind};

const KEYWORDS: &[&str] = &["SELECT", "FROM", "JOIN", "ON", "WHERE", "AND", "GROUP", "BY"];

/// Parses a query into fields, aliases, optional join and filters
pub fn parse_query(sql: &str) -> ParseResult<ParsedQuery> {
    if sql.trim().is_empty() {
        return Err(ParseError::empty_query());
    }
    let tokens = tokenize(sql)?;
    let raw = Parser::new(tokens).parse()?;
    raw.resolve()
}

/// Parsed but not yet alias-resolved query
struct RawQuery {
    select: Option<Vec<Vec<String>>>,
    from: (String, Option<String>),
    join: Option<RawJoin>,
    conditions: Vec<(Vec<String>, Value)>,
    group_by: Vec<Vec<String>>,
}

struct RawJoin {
    collection: String,
    alias: Option<String>,
    left: Vec<String>,
    right: Vec<String>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> ParseResult<RawQuery> {
        self.expect_keyword("SELECT")?;
        let select = self.parse_select_list()?;
        self.expect_keyword("FROM")?;
        let from = self.parse_source()?;

        let join = if self.eat_keyword("JOIN") {
            let (collection, alias) = self.parse_source()?;
            self.expect_keyword("ON")?;
            let left = self.parse_path()?;
            self.expect(TokenKind::Eq, "'='")?;
            let right = self.parse_path()?;
            Some(RawJoin {
                collection,
                alias,
                left,
                right,
            })
        } else {
            None
        };

        let mut conditions = Vec::new();
        if self.eat_keyword("WHERE") {
            loop {
                let path = self.parse_path()?;
                self.expect(TokenKind::Eq, "'='")?;
                let value = self.parse_value()?;
                conditions.push((path, value));
                if !self.eat_keyword("AND") {
                    break;
                }
            }
        }

        let mut group_by = Vec::new();
        if self.eat_keyword("GROUP") {
            self.expect_keyword("BY")?;
            group_by.push(self.parse_path()?);
            while self.eat(&TokenKind::Comma) {
                group_by.push(self.parse_path()?);
            }
        }

        self.eat(&TokenKind::Semicolon);
        self.expect(TokenKind::Eof, "end of query")?;

        Ok(RawQuery {
            select,
            from,
            join,
            conditions,
            group_by,
        })
    }

    /// `None` for `*`
    fn parse_select_list(&mut self) -> ParseResult<Option<Vec<Vec<String>>>> {
        if self.eat(&TokenKind::Star) {
            return Ok(None);
        }
        let mut fields = vec![self.parse_path()?];
        while self.eat(&TokenKind::Comma) {
            fields.push(self.parse_path()?);
        }
        Ok(Some(fields))
    }

    /// `collection [alias]`
    fn parse_source(&mut self) -> ParseResult<(String, Option<String>)> {
        let collection = self.expect_ident("collection name")?;
        let alias = match &self.peek().kind {
            TokenKind::Ident(word) if !is_keyword(word) => {
                let alias = word.clone();
                self.pos += 1;
                Some(alias)
            }
            _ => None,
        };
        Ok((collection, alias))
    }

    fn parse_path(&mut self) -> ParseResult<Vec<String>> {
        let mut parts = vec![self.expect_ident("field name")?];
        while self.eat(&TokenKind::Dot) {
            parts.push(self.expect_ident("field name")?);
        }
        Ok(parts)
    }

    /// Quoted string, else integer, else float, else the raw token text
    fn parse_value(&mut self) -> ParseResult<Value> {
        let token = self.advance();
        match token.kind {
            TokenKind::Str(s) => Ok(Value::String(s)),
            TokenKind::Number(text) => Ok(literal_value(&text)),
            TokenKind::Ident(word) if !is_keyword(&word) => {
                let mut raw = word;
                while self.eat(&TokenKind::Dot) {
                    raw.push('.');
                    raw.push_str(&self.expect_ident("field name")?);
                }
                Ok(literal_value(&raw))
            }
            other => Err(ParseError::unexpected_token(
                "a literal value",
                &other.to_string(),
                token.offset,
            )),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            let token = self.peek();
            Err(ParseError::unexpected_token(
                expected,
                &token.kind.to_string(),
                token.offset,
            ))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match &self.peek().kind {
            TokenKind::Ident(word) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            let token = self.peek();
            Err(ParseError::unexpected_token(
                keyword,
                &token.kind.to_string(),
                token.offset,
            ))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> ParseResult<String> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(word) if !is_keyword(&word) => {
                self.pos += 1;
                Ok(word)
            }
            other => Err(ParseError::unexpected_token(
                expected,
                &other.to_string(),
                token.offset,
            )),
        }
    }
}

impl RawQuery {
    fn resolve(self) -> ParseResult<ParsedQuery> {
        let (base, base_alias) = self.from;

        let mut aliases = BTreeMap::new();
        aliases.insert(String::new(), base.clone());
        aliases.insert(base.clone(), base.clone());
        if let Some(alias) = &base_alias {
            aliases.insert(alias.clone(), base.clone());
        }

        let join = match self.join {
            Some(raw) => {
                aliases.insert(raw.collection.clone(), raw.collection.clone());
                if let Some(alias) = &raw.alias {
                    aliases.insert(alias.clone(), raw.collection.clone());
                }
                Some(resolve_join(&aliases, &base, &raw)?)
            }
            None => None,
        };

        let select_fields = self
            .select
            .unwrap_or_default()
            .iter()
            .map(|path| normalize_field(&aliases, path))
            .collect();

        let group_by = self
            .group_by
            .iter()
            .map(|path| normalize_field(&aliases, path))
            .collect();

        let filters = self
            .conditions
            .into_iter()
            .map(|(path, value)| {
                let (collection, field) = split_qualified(&aliases, &path)
                    .unwrap_or_else(|| (base.clone(), path.join(".")));
                FilterPredicate::new(collection, field, value)
            })
            .collect();

        Ok(ParsedQuery {
            select_fields,
            base_collection: base,
            aliases,
            join,
            filters,
            group_by,
        })
    }
}

fn resolve_join(
    aliases: &BTreeMap<String, String>,
    base: &str,
    raw: &RawJoin,
) -> ParseResult<JoinPredicate> {
    let (first_coll, first_field) = split_qualified(aliases, &raw.left)
        .ok_or_else(|| ParseError::unknown_alias(&raw.left[0]))?;
    let (second_coll, second_field) = split_qualified(aliases, &raw.right)
        .ok_or_else(|| ParseError::unknown_alias(&raw.right[0]))?;

    if first_coll == base && second_coll == raw.collection {
        Ok(JoinPredicate::new(first_coll, first_field, second_coll, second_field))
    } else if first_coll == raw.collection && second_coll == base {
        Ok(JoinPredicate::new(second_coll, second_field, first_coll, first_field))
    } else {
        Err(ParseError::invalid_join(format!(
            "Join condition must relate '{}' and '{}'",
            base, raw.collection
        )))
    }
}

/// `alias.rest` -> (collection, rest) when the qualifier is a known alias
fn split_qualified(aliases: &BTreeMap<String, String>, path: &[String]) -> Option<(String, String)> {
    if path.len() < 2 {
        return None;
    }
    aliases
        .get(&path[0])
        .map(|collection| (collection.clone(), path[1..].join(".")))
}

/// `alias.name` -> `collection.name`; other paths are kept verbatim
fn normalize_field(aliases: &BTreeMap<String, String>, path: &[String]) -> String {
    match split_qualified(aliases, path) {
        Some((collection, rest)) => format!("{}.{}", collection, rest),
        None => path.join("."),
    }
}

fn literal_value(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(text.to_string())
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}
