use serde_json::Value;

use super::{Comparison, Filter, FilterTest, JsonPath, JsonPathError, Segment, Selector};

/// Parses a path query such as `$.stores[*]['store id']`.
pub fn parse(input: &str) -> Result<JsonPath, JsonPathError> {
    let input = input.trim();
    let mut parser = Parser {
        input,
        bytes: input.as_bytes(),
        cursor: 0,
    };
    parser.path()
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    cursor: usize,
}

impl Parser<'_> {
    fn path(&mut self) -> Result<JsonPath, JsonPathError> {
        if self.peek() != Some(b'$') {
            return Err(self.error("path must start with `$`"));
        }
        self.cursor += 1;

        let mut segments = Vec::new();
        while let Some(byte) = self.peek() {
            match byte {
                b'.' if self.peek_at(1) == Some(b'.') => {
                    self.cursor += 2;
                    let selector = match self.peek() {
                        Some(b'[') => self.bracket()?,
                        Some(b'*') => {
                            self.cursor += 1;
                            Selector::Wildcard
                        }
                        _ => Selector::Name(self.name()?),
                    };
                    segments.push(Segment::Descendant(selector));
                }
                b'.' => {
                    self.cursor += 1;
                    let selector = match self.peek() {
                        Some(b'*') => {
                            self.cursor += 1;
                            Selector::Wildcard
                        }
                        _ => Selector::Name(self.name()?),
                    };
                    segments.push(Segment::Child(selector));
                }
                b'[' => segments.push(Segment::Child(self.bracket()?)),
                _ => {
                    let unexpected = self.input[self.cursor..].chars().next().unwrap_or('?');
                    return Err(self.error(format!("unexpected `{unexpected}`")));
                }
            }
        }
        Ok(JsonPath { segments })
    }

    fn name(&mut self) -> Result<String, JsonPathError> {
        let start = self.cursor;
        while let Some(byte) = self.peek() {
            if byte == b'.' || byte == b'[' {
                break;
            }
            self.cursor += 1;
        }
        if start == self.cursor {
            return Err(self.error("expected member name"));
        }
        Ok(self.input[start..self.cursor].to_string())
    }

    fn bracket(&mut self) -> Result<Selector, JsonPathError> {
        self.cursor += 1;
        let mut selectors = Vec::new();
        loop {
            self.skip_spaces();
            selectors.push(self.bracket_item()?);
            self.skip_spaces();
            match self.peek() {
                Some(b',') => self.cursor += 1,
                Some(b']') => {
                    self.cursor += 1;
                    break;
                }
                Some(_) => return Err(self.error("expected `,` or `]`")),
                None => return Err(self.error("path cannot end inside `[`")),
            }
        }
        Ok(if selectors.len() == 1 {
            selectors.remove(0)
        } else {
            Selector::Union(selectors)
        })
    }

    fn bracket_item(&mut self) -> Result<Selector, JsonPathError> {
        match self.peek() {
            Some(quote @ (b'\'' | b'"')) => Ok(Selector::Name(self.quoted(quote)?)),
            Some(b'*') => {
                self.cursor += 1;
                Ok(Selector::Wildcard)
            }
            Some(b'?') => self.filter(),
            Some(b'(') => Err(self.error("script expressions are not supported")),
            Some(_) => self.index_or_slice(),
            None => Err(self.error("path cannot end inside `[`")),
        }
    }

    fn filter(&mut self) -> Result<Selector, JsonPathError> {
        self.cursor += 1;
        self.skip_spaces();
        self.expect(b'(')?;
        self.skip_spaces();
        self.expect(b'@')?;

        let mut field = Vec::new();
        loop {
            match self.peek() {
                Some(b'.') => {
                    self.cursor += 1;
                    field.push(self.filter_member()?);
                }
                Some(b'[') => {
                    self.cursor += 1;
                    self.skip_spaces();
                    let name = match self.peek() {
                        Some(quote @ (b'\'' | b'"')) => self.quoted(quote)?,
                        _ => return Err(self.error("expected quoted member name in filter")),
                    };
                    self.skip_spaces();
                    self.expect(b']')?;
                    field.push(name);
                }
                _ => break,
            }
        }

        self.skip_spaces();
        let test = if self.peek() == Some(b')') {
            FilterTest::Exists
        } else {
            let comparison = self.comparison()?;
            self.skip_spaces();
            let literal = self.literal()?;
            self.skip_spaces();
            FilterTest::Compare(comparison, literal)
        };
        self.expect(b')')?;
        Ok(Selector::Filter(Filter { field, test }))
    }

    fn filter_member(&mut self) -> Result<String, JsonPathError> {
        let start = self.cursor;
        while let Some(byte) = self.peek() {
            if matches!(byte, b'.' | b'[' | b' ' | b')' | b'=' | b'!' | b'<' | b'>') {
                break;
            }
            self.cursor += 1;
        }
        if start == self.cursor {
            return Err(self.error("expected member name"));
        }
        Ok(self.input[start..self.cursor].to_string())
    }

    fn comparison(&mut self) -> Result<Comparison, JsonPathError> {
        let (comparison, width) = match (self.peek(), self.peek_at(1)) {
            (Some(b'='), Some(b'=')) => (Comparison::Eq, 2),
            (Some(b'!'), Some(b'=')) => (Comparison::Ne, 2),
            (Some(b'<'), Some(b'=')) => (Comparison::Le, 2),
            (Some(b'>'), Some(b'=')) => (Comparison::Ge, 2),
            (Some(b'<'), _) => (Comparison::Lt, 1),
            (Some(b'>'), _) => (Comparison::Gt, 1),
            _ => return Err(self.error("expected `)` or a comparison operator")),
        };
        self.cursor += width;
        Ok(comparison)
    }

    fn literal(&mut self) -> Result<Value, JsonPathError> {
        if let Some(quote @ (b'\'' | b'"')) = self.peek() {
            return self.quoted(quote).map(Value::String);
        }
        let start = self.cursor;
        while matches!(self.peek(), Some(byte) if byte != b' ' && byte != b')') {
            self.cursor += 1;
        }
        match serde_json::from_str::<Value>(&self.input[start..self.cursor]) {
            Ok(value @ (Value::Null | Value::Bool(_) | Value::Number(_))) => Ok(value),
            _ => Err(JsonPathError::new(
                self.input,
                start,
                "expected a string, number, boolean or null literal",
            )),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), JsonPathError> {
        if self.peek() == Some(byte) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", char::from(byte))))
        }
    }

    fn quoted(&mut self, quote: u8) -> Result<String, JsonPathError> {
        self.cursor += 1;
        let mut out = String::new();
        let mut run_start = self.cursor;
        while let Some(byte) = self.peek() {
            if byte == b'\\' {
                out.push_str(&self.input[run_start..self.cursor]);
                self.cursor += 1;
                let Some(escaped) = self.input[self.cursor..].chars().next() else {
                    break;
                };
                out.push(escaped);
                self.cursor += escaped.len_utf8();
                run_start = self.cursor;
                continue;
            }
            if byte == quote {
                out.push_str(&self.input[run_start..self.cursor]);
                self.cursor += 1;
                return Ok(out);
            }
            self.cursor += 1;
        }
        Err(self.error("unterminated quoted name"))
    }

    fn index_or_slice(&mut self) -> Result<Selector, JsonPathError> {
        let start = self.integer()?;
        self.skip_spaces();
        if self.peek() != Some(b':') {
            return start
                .map(Selector::Index)
                .ok_or_else(|| self.error("expected quoted name, index, slice or `*`"));
        }
        self.cursor += 1;
        self.skip_spaces();
        let end = self.integer()?;
        self.skip_spaces();
        if self.peek() == Some(b':') {
            return Err(self.error("slice steps are not supported"));
        }
        Ok(Selector::Slice { start, end })
    }

    fn integer(&mut self) -> Result<Option<i64>, JsonPathError> {
        let start = self.cursor;
        if self.peek() == Some(b'-') {
            self.cursor += 1;
        }
        let digits_start = self.cursor;
        while matches!(self.peek(), Some(byte) if byte.is_ascii_digit()) {
            self.cursor += 1;
        }
        if digits_start == self.cursor {
            if start != self.cursor {
                return Err(self.error("expected digits after `-`"));
            }
            return Ok(None);
        }
        self.input[start..self.cursor]
            .parse::<i64>()
            .map(Some)
            .map_err(|error| JsonPathError::new(self.input, start, format!("invalid index: {error}")))
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.cursor += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor + offset).copied()
    }

    fn error(&self, reason: impl Into<String>) -> JsonPathError {
        JsonPathError::new(self.input, self.cursor, reason)
    }
}
