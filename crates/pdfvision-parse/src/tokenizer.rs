//! Content stream tokenizer.
//!
//! Splits decoded page content into [`Operator`]s, each carrying the
//! [`Operand`]s that preceded it. Inline image data (`BI ... ID ... EI`) is
//! skipped since it never contributes glyphs.

use crate::error::BackendError;

/// A content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`, with `#xx` escapes decoded.
    Name(String),
    /// Literal `(...)` or hex `<...>` string, as raw bytes.
    String(Vec<u8>),
    Array(Vec<Operand>),
    Boolean(bool),
    Null,
    /// Inline dictionary, as used by `BDC` property lists.
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A content stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

/// Parse content stream bytes into operators.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for unterminated strings, arrays or
/// dictionaries and for malformed numbers.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut ops = Vec::new();
    let mut stack = Vec::new();

    while let Some(token) = lexer.next_token()? {
        match token {
            Token::Operand(operand) => stack.push(operand),
            Token::Keyword(kw) if kw == "BI" => {
                lexer.skip_inline_image()?;
                stack.clear();
            }
            Token::Keyword(kw) => ops.push(Operator {
                name: kw,
                operands: std::mem::take(&mut stack),
            }),
            Token::ArrayEnd | Token::DictEnd => {
                return Err(BackendError::Interpreter(format!(
                    "unbalanced delimiter at byte {}",
                    lexer.pos
                )));
            }
        }
    }
    Ok(ops)
}

enum Token {
    Operand(Operand),
    Keyword(String),
    ArrayEnd,
    DictEnd,
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn err(&self, what: &str) -> BackendError {
        BackendError::Interpreter(format!("{what} at byte {}", self.pos))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|b| b != b'\n' && b != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, BackendError> {
        loop {
            self.skip_whitespace_and_comments();
            let Some(b) = self.peek() else {
                return Ok(None);
            };
            let token = match b {
                b'(' => Token::Operand(Operand::String(self.literal_string()?)),
                b'<' if self.peek_at(1) == Some(b'<') => {
                    self.pos += 2;
                    Token::Operand(Operand::Dictionary(self.dictionary()?))
                }
                b'<' => Token::Operand(Operand::String(self.hex_string()?)),
                b'>' if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    Token::DictEnd
                }
                b'[' => {
                    self.pos += 1;
                    Token::Operand(Operand::Array(self.array()?))
                }
                b']' => {
                    self.pos += 1;
                    Token::ArrayEnd
                }
                b'/' => Token::Operand(Operand::Name(self.name())),
                b'0'..=b'9' | b'+' | b'-' | b'.' => Token::Operand(self.number()?),
                b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                    let kw = self.keyword();
                    match kw.as_str() {
                        "true" => Token::Operand(Operand::Boolean(true)),
                        "false" => Token::Operand(Operand::Boolean(false)),
                        "null" => Token::Operand(Operand::Null),
                        _ => Token::Keyword(kw),
                    }
                }
                _ => {
                    // stray byte, e.g. `)` or `{`
                    self.pos += 1;
                    continue;
                }
            };
            return Ok(Some(token));
        }
    }

    /// Array elements up to `]`; the `[` is already consumed.
    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        let mut items = Vec::new();
        loop {
            match self.next_token()? {
                Some(Token::Operand(o)) => items.push(o),
                // operators never appear inside arrays; keep them as names
                Some(Token::Keyword(kw)) => items.push(Operand::Name(kw)),
                Some(Token::ArrayEnd) => return Ok(items),
                Some(Token::DictEnd) | None => return Err(self.err("unterminated array")),
            }
        }
    }

    /// Dictionary entries up to `>>`; the `<<` is already consumed.
    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        let mut entries = Vec::new();
        loop {
            let key = match self.next_token()? {
                Some(Token::DictEnd) => return Ok(entries),
                Some(Token::Operand(Operand::Name(key))) => key,
                Some(_) => return Err(self.err("expected name key in dictionary")),
                None => return Err(self.err("unterminated dictionary")),
            };
            let value = match self.next_token()? {
                Some(Token::Operand(o)) => o,
                Some(Token::Keyword(kw)) => Operand::Name(kw),
                _ => return Err(self.err("missing dictionary value")),
            };
            entries.push((key, value));
        }
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out),
                _ => out.push(b),
            }
        }
        Err(self.err("unterminated literal string"))
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn escape(&mut self, out: &mut Vec<u8>) {
        let Some(b) = self.peek() else {
            return;
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'\r' => {
                // line continuation, CR or CRLF
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            other => out.push(other),
        }
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut nibbles = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(self.err("unterminated hex string"));
            };
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            nibbles.push(hex_value(b).ok_or_else(|| self.err("invalid hex digit"))?);
        }
        if nibbles.len() % 2 == 1 {
            nibbles.push(0);
        }
        Ok(nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !is_whitespace(b) && !is_delimiter(b))
        {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(hi), Some(lo)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    name.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            name.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.err("invalid number"))?;
        // a lone sign or dot reads as zero
        if text.trim_start_matches(['+', '-', '.']).is_empty() {
            return Ok(Operand::Integer(0));
        }
        if seen_dot {
            text.parse()
                .map(Operand::Real)
                .map_err(|_| self.err("invalid real number"))
        } else {
            text.parse()
                .map(Operand::Integer)
                .map_err(|_| self.err("invalid integer"))
        }
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'*' | b'\'' | b'"'))
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Skip an inline image through its `EI` keyword; `BI` is already consumed.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        // dictionary part up to ID
        loop {
            match self.next_token()? {
                Some(Token::Keyword(kw)) if kw == "ID" => break,
                Some(_) => {}
                None => return Err(self.err("inline image without ID")),
            }
        }
        self.pos += 1;
        while self.pos + 1 < self.input.len() {
            let preceded = is_whitespace(self.input[self.pos - 1]);
            let followed = self
                .peek_at(2)
                .is_none_or(|b| is_whitespace(b) || is_delimiter(b));
            if preceded && followed && self.input[self.pos] == b'E' && self.input[self.pos + 1] == b'I' {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(self.err("inline image without EI"))
    }
}
