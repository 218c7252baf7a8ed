//! Pull parser over JSON text.
//!
//! The parser hands out one [`Token`] at a time. Field names are reported as
//! their own token, followed by the token of the value, which is what the
//! canonical-order document reader relies on.

use super::error::DocumentError;

/// A JSON token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName,
    String,
    Number,
    Bool,
    Null,
}

impl Token {
    pub fn describe(self) -> &'static str {
        match self {
            Token::StartObject => "start of object",
            Token::EndObject => "end of object",
            Token::StartArray => "start of array",
            Token::EndArray => "end of array",
            Token::FieldName => "field name",
            Token::String => "string",
            Token::Number => "number",
            Token::Bool => "boolean",
            Token::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Expecting a key or `}`; `first` is true before any entry.
    ObjectKey { first: bool },
    /// A key was read, expecting `:` and a value.
    ObjectValue,
    /// Expecting a value or `]`.
    Array { first: bool },
}

/// Pull parser over a JSON document.
///
/// ```
/// use model_pack::document::{DocumentParser, Token};
///
/// let mut p = DocumentParser::new(r#"{"a":[1,"x"]}"#);
/// assert_eq!(p.next_token().unwrap(), Some(Token::StartObject));
/// assert_eq!(p.next_token().unwrap(), Some(Token::FieldName));
/// assert_eq!(p.current_name(), Some("a"));
/// assert_eq!(p.next_token().unwrap(), Some(Token::StartArray));
/// assert_eq!(p.next_token().unwrap(), Some(Token::Number));
/// assert_eq!(p.long_value().unwrap(), 1);
/// assert_eq!(p.next_token().unwrap(), Some(Token::String));
/// assert_eq!(p.text().unwrap(), "x");
/// assert_eq!(p.next_token().unwrap(), Some(Token::EndArray));
/// assert_eq!(p.next_token().unwrap(), Some(Token::EndObject));
/// assert_eq!(p.next_token().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentParser<'a> {
    data: &'a [u8],
    x: usize,
    stack: Vec<Frame>,
    current: Option<Token>,
    name: Option<String>,
    text: String,
    boolean: bool,
    done: bool,
}

impl<'a> DocumentParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            data: text.as_bytes(),
            x: 0,
            stack: Vec::new(),
            current: None,
            name: None,
            text: String::new(),
            boolean: false,
            done: false,
        }
    }

    /// Creates a parser over raw bytes, which must be valid UTF-8.
    pub fn from_slice(data: &'a [u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(data).map_err(|_| DocumentError::InvalidUtf8)?;
        Ok(Self::new(text))
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.x
    }

    pub fn current_token(&self) -> Option<Token> {
        self.current
    }

    /// Name of the innermost field whose name or value is current.
    pub fn current_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Advances to the next token; `None` once the document is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, DocumentError> {
        self.skip_whitespace();
        let token = match self.stack.last().copied() {
            None => {
                if self.done {
                    if self.x < self.data.len() {
                        return Err(DocumentError::TrailingData(self.x));
                    }
                    None
                } else {
                    Some(self.read_value()?)
                }
            }
            Some(Frame::ObjectKey { first }) => {
                let b = self.peek()?;
                if b == b'}' {
                    self.x += 1;
                    self.close();
                    Some(Token::EndObject)
                } else {
                    if !first {
                        self.expect(b',')?;
                        self.skip_whitespace();
                    }
                    if self.peek()? != b'"' {
                        return Err(DocumentError::Invalid(self.x));
                    }
                    self.x += 1;
                    let name = self.read_string_body()?;
                    self.name = Some(name);
                    self.set_top(Frame::ObjectValue);
                    Some(Token::FieldName)
                }
            }
            Some(Frame::ObjectValue) => {
                self.expect(b':')?;
                self.skip_whitespace();
                self.set_top(Frame::ObjectKey { first: false });
                Some(self.read_value()?)
            }
            Some(Frame::Array { first }) => {
                if self.peek()? == b']' {
                    self.x += 1;
                    self.close();
                    Some(Token::EndArray)
                } else {
                    if !first {
                        self.expect(b',')?;
                        self.skip_whitespace();
                    }
                    self.set_top(Frame::Array { first: false });
                    Some(self.read_value()?)
                }
            }
        };
        self.current = token;
        Ok(token)
    }

    /// Skips the children of the current object or array, leaving the parser
    /// on the matching end token. Does nothing on scalar tokens.
    pub fn skip_children(&mut self) -> Result<(), DocumentError> {
        if !matches!(
            self.current,
            Some(Token::StartObject) | Some(Token::StartArray)
        ) {
            return Ok(());
        }
        let mut open = 1usize;
        while open > 0 {
            match self.next_token()? {
                Some(Token::StartObject) | Some(Token::StartArray) => open += 1,
                Some(Token::EndObject) | Some(Token::EndArray) => open -= 1,
                Some(_) => {}
                None => return Err(DocumentError::UnexpectedEnd(self.x)),
            }
        }
        Ok(())
    }

    /// Text of the current string token.
    pub fn text(&self) -> Result<&str, DocumentError> {
        self.require(Token::String)?;
        Ok(&self.text)
    }

    /// Raw text of the current number token.
    pub fn number_text(&self) -> Result<&str, DocumentError> {
        self.require(Token::Number)?;
        Ok(&self.text)
    }

    pub fn long_value(&self) -> Result<i64, DocumentError> {
        let text = self.number_text()?;
        text.parse::<i64>()
            .map_err(|_| DocumentError::NumberRange(text.to_owned()))
    }

    pub fn int_value(&self) -> Result<i32, DocumentError> {
        let text = self.number_text()?;
        text.parse::<i32>()
            .map_err(|_| DocumentError::NumberRange(text.to_owned()))
    }

    pub fn bool_value(&self) -> Result<bool, DocumentError> {
        self.require(Token::Bool)?;
        Ok(self.boolean)
    }

    fn require(&self, token: Token) -> Result<(), DocumentError> {
        match self.current {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(DocumentError::UnexpectedToken {
                expected: token.describe(),
                found: t.describe(),
            }),
            None => Err(DocumentError::UnexpectedToken {
                expected: token.describe(),
                found: "no token",
            }),
        }
    }

    fn set_top(&mut self, frame: Frame) {
        if let Some(top) = self.stack.last_mut() {
            *top = frame;
        }
    }

    fn close(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() {
            self.done = true;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.data.get(self.x) {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.x += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Result<u8, DocumentError> {
        self.data
            .get(self.x)
            .copied()
            .ok_or(DocumentError::UnexpectedEnd(self.x))
    }

    fn expect(&mut self, b: u8) -> Result<(), DocumentError> {
        if self.peek()? != b {
            return Err(DocumentError::Invalid(self.x));
        }
        self.x += 1;
        Ok(())
    }

    fn read_value(&mut self) -> Result<Token, DocumentError> {
        let token = match self.peek()? {
            b'{' => {
                self.x += 1;
                self.stack.push(Frame::ObjectKey { first: true });
                return Ok(Token::StartObject);
            }
            b'[' => {
                self.x += 1;
                self.stack.push(Frame::Array { first: true });
                return Ok(Token::StartArray);
            }
            b'"' => {
                self.x += 1;
                self.text = self.read_string_body()?;
                Token::String
            }
            b't' => {
                self.literal("true")?;
                self.boolean = true;
                Token::Bool
            }
            b'f' => {
                self.literal("false")?;
                self.boolean = false;
                Token::Bool
            }
            b'n' => {
                self.literal("null")?;
                Token::Null
            }
            b'-' | b'0'..=b'9' => {
                self.read_number()?;
                Token::Number
            }
            _ => return Err(DocumentError::Invalid(self.x)),
        };
        if self.stack.is_empty() {
            self.done = true;
        }
        Ok(token)
    }

    fn literal(&mut self, word: &str) -> Result<(), DocumentError> {
        let end = self.x + word.len();
        if self.data.get(self.x..end) != Some(word.as_bytes()) {
            return Err(DocumentError::Invalid(self.x));
        }
        self.x = end;
        Ok(())
    }

    fn read_number(&mut self) -> Result<(), DocumentError> {
        let start = self.x;
        let digits = |p: &mut Self| {
            let from = p.x;
            while matches!(p.data.get(p.x), Some(b'0'..=b'9')) {
                p.x += 1;
            }
            p.x - from
        };
        if self.data.get(self.x) == Some(&b'-') {
            self.x += 1;
        }
        let int_start = self.x;
        if digits(self) == 0 {
            return Err(DocumentError::Invalid(self.x));
        }
        if self.data[int_start] == b'0' && self.x - int_start > 1 {
            return Err(DocumentError::Invalid(int_start));
        }
        if self.data.get(self.x) == Some(&b'.') {
            self.x += 1;
            if digits(self) == 0 {
                return Err(DocumentError::Invalid(self.x));
            }
        }
        if matches!(self.data.get(self.x), Some(b'e' | b'E')) {
            self.x += 1;
            if matches!(self.data.get(self.x), Some(b'+' | b'-')) {
                self.x += 1;
            }
            if digits(self) == 0 {
                return Err(DocumentError::Invalid(self.x));
            }
        }
        // digits and signs only, always valid UTF-8
        self.text = String::from_utf8_lossy(&self.data[start..self.x]).into_owned();
        Ok(())
    }

    /// Reads a string whose opening quote has been consumed.
    fn read_string_body(&mut self) -> Result<String, DocumentError> {
        let mut out = String::new();
        let mut run = self.x;
        loop {
            let b = self.peek()?;
            match b {
                b'"' => {
                    out.push_str(self.slice(run, self.x));
                    self.x += 1;
                    return Ok(out);
                }
                b'\\' => {
                    out.push_str(self.slice(run, self.x));
                    self.x += 1;
                    out.push(self.read_escape()?);
                    run = self.x;
                }
                0x00..=0x1f => return Err(DocumentError::Invalid(self.x)),
                _ => self.x += 1,
            }
        }
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        // The input came from a `&str` and both bounds sit on ASCII bytes.
        std::str::from_utf8(&self.data[start..end]).unwrap_or_default()
    }

    fn read_escape(&mut self) -> Result<char, DocumentError> {
        let at = self.x;
        let c = match self.peek()? {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                self.x += 1;
                let hi = self.read_hex4()?;
                let code = if (0xd800..0xdc00).contains(&hi) {
                    if self.data.get(self.x..self.x + 2) != Some(b"\\u".as_slice()) {
                        return Err(DocumentError::InvalidEscape(at));
                    }
                    self.x += 2;
                    let lo = self.read_hex4()?;
                    if !(0xdc00..0xe000).contains(&lo) {
                        return Err(DocumentError::InvalidEscape(at));
                    }
                    0x10000 + ((hi - 0xd800) << 10) + (lo - 0xdc00)
                } else {
                    hi
                };
                return char::from_u32(code).ok_or(DocumentError::InvalidEscape(at));
            }
            _ => return Err(DocumentError::InvalidEscape(at)),
        };
        self.x += 1;
        Ok(c)
    }

    fn read_hex4(&mut self) -> Result<u32, DocumentError> {
        let hex = self
            .data
            .get(self.x..self.x + 4)
            .ok_or(DocumentError::UnexpectedEnd(self.x))?;
        let hex = std::str::from_utf8(hex).map_err(|_| DocumentError::InvalidEscape(self.x))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| DocumentError::InvalidEscape(self.x))?;
        self.x += 4;
        Ok(code)
    }
}
