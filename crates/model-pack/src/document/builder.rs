//! Streaming JSON document builder.

use model_pack_buffers::Writer;

use super::error::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Object { first: bool, after_name: bool },
    Array { first: bool },
}

/// Writes a JSON document token by token.
///
/// Every method checks that the token is legal at the current position, so
/// a sequence of calls either produces well-formed JSON or fails with
/// [`DocumentError::Builder`].
///
/// ```
/// use model_pack::document::DocumentBuilder;
///
/// let mut b = DocumentBuilder::new();
/// b.start_object().unwrap();
/// b.field_name("a").unwrap().value_i64(3).unwrap();
/// b.field_name("b").unwrap().start_array().unwrap();
/// b.value_str("x").unwrap().value_null().unwrap();
/// b.end_array().unwrap().end_object().unwrap();
/// assert_eq!(b.into_string().unwrap(), r#"{"a":3,"b":["x",null]}"#);
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    pub writer: Writer,
    stack: Vec<Scope>,
    done: bool,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nesting depth of the currently open scopes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `true` once a complete top-level value has been written.
    pub fn is_complete(&self) -> bool {
        self.done && self.stack.is_empty()
    }

    fn before_value(&mut self) -> Result<(), DocumentError> {
        match self.stack.last_mut() {
            None if self.done => Err(DocumentError::Builder("document already complete")),
            None => Ok(()),
            Some(Scope::Object { after_name, .. }) => {
                if !*after_name {
                    return Err(DocumentError::Builder("value without a field name"));
                }
                *after_name = false;
                Ok(())
            }
            Some(Scope::Array { first }) => {
                if !*first {
                    self.writer.u8(b',');
                }
                *first = false;
                Ok(())
            }
        }
    }

    fn after_value(&mut self) {
        if self.stack.is_empty() {
            self.done = true;
        }
    }

    pub fn start_object(&mut self) -> Result<&mut Self, DocumentError> {
        self.before_value()?;
        self.writer.u8(b'{');
        self.stack.push(Scope::Object {
            first: true,
            after_name: false,
        });
        Ok(self)
    }

    pub fn end_object(&mut self) -> Result<&mut Self, DocumentError> {
        match self.stack.last() {
            Some(Scope::Object {
                after_name: false, ..
            }) => {
                self.stack.pop();
                self.writer.u8(b'}');
                self.after_value();
                Ok(self)
            }
            Some(Scope::Object { .. }) => Err(DocumentError::Builder("field name without a value")),
            _ => Err(DocumentError::Builder("no object to close")),
        }
    }

    pub fn start_array(&mut self) -> Result<&mut Self, DocumentError> {
        self.before_value()?;
        self.writer.u8(b'[');
        self.stack.push(Scope::Array { first: true });
        Ok(self)
    }

    pub fn end_array(&mut self) -> Result<&mut Self, DocumentError> {
        match self.stack.last() {
            Some(Scope::Array { .. }) => {
                self.stack.pop();
                self.writer.u8(b']');
                self.after_value();
                Ok(self)
            }
            _ => Err(DocumentError::Builder("no array to close")),
        }
    }

    pub fn field_name(&mut self, name: &str) -> Result<&mut Self, DocumentError> {
        match self.stack.last_mut() {
            Some(Scope::Object { first, after_name }) if !*after_name => {
                if !*first {
                    self.writer.u8(b',');
                }
                *first = false;
                *after_name = true;
            }
            _ => return Err(DocumentError::Builder("field name outside of an object")),
        }
        self.write_quoted(name)?;
        self.writer.u8(b':');
        Ok(self)
    }

    pub fn value_null(&mut self) -> Result<&mut Self, DocumentError> {
        self.before_value()?;
        self.writer.utf8("null");
        self.after_value();
        Ok(self)
    }

    pub fn value_bool(&mut self, b: bool) -> Result<&mut Self, DocumentError> {
        self.before_value()?;
        self.writer.utf8(if b { "true" } else { "false" });
        self.after_value();
        Ok(self)
    }

    pub fn value_i64(&mut self, n: i64) -> Result<&mut Self, DocumentError> {
        self.before_value()?;
        self.writer.utf8(&n.to_string());
        self.after_value();
        Ok(self)
    }

    pub fn value_str(&mut self, s: &str) -> Result<&mut Self, DocumentError> {
        self.before_value()?;
        self.write_quoted(s)?;
        self.after_value();
        Ok(self)
    }

    fn write_quoted(&mut self, s: &str) -> Result<(), DocumentError> {
        let quoted = serde_json::to_string(s)?;
        self.writer.utf8(&quoted);
        Ok(())
    }

    /// Returns the document bytes, failing if a scope is still open.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, DocumentError> {
        if !self.is_complete() {
            return Err(DocumentError::Builder("document is incomplete"));
        }
        Ok(self.writer.flush())
    }

    pub fn into_string(self) -> Result<String, DocumentError> {
        let bytes = self.into_bytes()?;
        String::from_utf8(bytes).map_err(|_| DocumentError::InvalidUtf8)
    }
}
