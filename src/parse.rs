//! A small parser for the engine's textual value forms.
//!
//! Accepts list literals (`[1, 2]`), struct literals (`{'a': 1}`), map
//! literals (`MAP {'a': 1}`) and the engine's map display form (`{a=1, b=2}`),
//! single-quoted strings with `''` escapes, double-quoted JSON strings, and
//! bare words. Bare words are classified as `NULL`, booleans, numbers, or
//! strings.

use serde_json::{Map as JsonMap, Number, Value};

use crate::{DecodeError, DecodeResult};

/// Parses a complete engine literal into a JSON tree.
pub(crate) fn parse_literal(target: &'static str, text: &str) -> DecodeResult<Value> {
    let mut parser = LiteralParser::new(target, text);
    let value = parser.parse_value()?;
    parser.finish()?;
    Ok(value)
}

/// Parses a map or struct literal, with or without a leading `MAP` keyword.
pub(crate) fn parse_map_literal(
    target: &'static str,
    text: &str,
) -> DecodeResult<JsonMap<String, Value>> {
    let mut parser = LiteralParser::new(target, text);
    parser.skip_whitespace();
    parser.eat_map_keyword();
    let map = parser.parse_object()?;
    parser.finish()?;
    Ok(map)
}

/// Maximum list/struct nesting, matching serde_json's recursion limit.
const MAX_DEPTH: usize = 128;

struct LiteralParser<'a> {
    target: &'static str,
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(target: &'static str, input: &'a str) -> Self {
        LiteralParser {
            target,
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: &str) -> DecodeError {
        DecodeError::malformed(self.target, format!("{reason} at offset {}", self.pos))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> DecodeResult<()> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(&format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(&format!("expected {expected:?}, found end of input"))),
        }
    }

    /// Consumes a leading `MAP` keyword (case-insensitively) when it is
    /// followed by an opening brace.
    fn eat_map_keyword(&mut self) -> bool {
        const KEYWORD: &str = "MAP";
        let rest = self.rest();
        if rest.len() < KEYWORD.len() || !rest.is_char_boundary(KEYWORD.len()) {
            return false;
        }
        let (head, tail) = rest.split_at(KEYWORD.len());
        if head.eq_ignore_ascii_case(KEYWORD) && tail.trim_start().starts_with('{') {
            self.pos += KEYWORD.len();
            true
        } else {
            false
        }
    }

    fn finish(&mut self) -> DecodeResult<()> {
        self.skip_whitespace();
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing characters"))
        }
    }

    fn parse_value(&mut self) -> DecodeResult<Value> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected a value")),
            Some('[') => self.nested(Self::parse_array).map(Value::Array),
            Some('{') => self.nested(Self::parse_object).map(Value::Object),
            Some('\'') => self.parse_single_quoted().map(Value::String),
            Some('"') => self.parse_double_quoted().map(Value::String),
            Some(_) => {
                if self.eat_map_keyword() {
                    return self.nested(Self::parse_object).map(Value::Object);
                }
                let word = self.parse_bare(&[',', ']', '}'])?;
                Ok(classify_bare(word))
            }
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> DecodeResult<T>,
    ) -> DecodeResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_array(&mut self) -> DecodeResult<Vec<Value>> {
        self.expect('[')?;
        let mut elements = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(elements);
        }
        loop {
            elements.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(elements),
                _ => return Err(self.error("expected ',' or ']' in list")),
            }
        }
    }

    fn parse_object(&mut self) -> DecodeResult<JsonMap<String, Value>> {
        self.expect('{')?;
        let mut fields = JsonMap::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(fields);
        }
        loop {
            let key = self.parse_key()?;
            self.skip_whitespace();
            match self.bump() {
                Some(':') | Some('=') => {}
                _ => return Err(self.error("expected ':' or '=' after key")),
            }
            let value = self.parse_value()?;
            fields.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(fields),
                _ => return Err(self.error("expected ',' or '}' in struct")),
            }
        }
    }

    fn parse_key(&mut self) -> DecodeResult<String> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') => self.parse_single_quoted(),
            Some('"') => self.parse_double_quoted(),
            _ => self.parse_bare(&[':', '=', ',', '}']).map(str::to_string),
        }
    }

    fn parse_single_quoted(&mut self) -> DecodeResult<String> {
        self.expect('\'')?;
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        s.push('\'');
                    } else {
                        return Ok(s);
                    }
                }
                Some(c) => s.push(c),
            }
        }
    }

    fn parse_double_quoted(&mut self) -> DecodeResult<String> {
        let start = self.pos;
        self.expect('"')?;
        let mut escaped = false;
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\\') if !escaped => escaped = true,
                Some('"') if !escaped => break,
                Some(_) => escaped = false,
            }
        }
        serde_json::from_str(&self.input[start..self.pos])
            .map_err(|e| self.error(&format!("invalid string escape: {e}")))
    }

    fn parse_bare(&mut self, terminators: &[char]) -> DecodeResult<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if terminators.contains(&c) {
                break;
            }
            self.bump();
        }
        let word = self.input[start..self.pos].trim();
        if word.is_empty() {
            return Err(self.error("expected a value"));
        }
        Ok(word)
    }
}

fn classify_bare(word: &str) -> Value {
    if word.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if word.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if word.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    parse_number(word).map_or_else(|| Value::String(word.to_string()), Value::Number)
}

/// Parses numeric text into a JSON number, preferring exact integers.
fn parse_number(word: &str) -> Option<Number> {
    if let Ok(i) = word.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = word.parse::<u64>() {
        return Some(Number::from(u));
    }
    if !word.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return None;
    }
    word.parse::<f64>().ok().and_then(Number::from_f64)
}
