//! Structured-document codec: models as JSON objects.
//!
//! Writing emits every catalog field in canonical order, `null` for absent
//! ones. Parsing either asserts that same order ([`FieldOrder::Canonical`])
//! or looks fields up by name ([`FieldOrder::ByName`]).

pub mod builder;
pub mod error;
pub mod parser;

pub use builder::DocumentBuilder;
pub use error::DocumentError;
pub use parser::{DocumentParser, Token};

use tracing::{debug, trace};

use crate::catalog::{self, FieldDescriptor};
use crate::dispatch::TypeTag;
use crate::error::ModelError;
use crate::model::{Model, ModelRef};
use crate::units::{CalendarUnit, DurationUnit, DurationValue, TimeZoneId};
use crate::value::{Record, Value};

/// How the parser matches document keys to catalog fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldOrder {
    /// Keys must appear exactly in canonical order, one per field.
    #[default]
    Canonical,
    /// Keys may appear in any order; unknown keys are skipped and missing
    /// keys leave the field absent.
    ByName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    pub field_order: FieldOrder,
    /// Maximum model nesting depth; the root model is depth 0.
    pub max_depth: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            field_order: FieldOrder::Canonical,
            max_depth: 64,
        }
    }
}

impl DocumentOptions {
    pub fn by_name() -> Self {
        Self {
            field_order: FieldOrder::ByName,
            ..Self::default()
        }
    }
}

/// Writes `model` as one JSON object.
pub fn write_document<'b, M: Model>(
    builder: &'b mut DocumentBuilder,
    model: &M,
) -> Result<&'b mut DocumentBuilder, ModelError> {
    write_record(builder, &Record::capture(model))
}

pub fn write_record<'b>(
    builder: &'b mut DocumentBuilder,
    record: &Record,
) -> Result<&'b mut DocumentBuilder, ModelError> {
    let model = record.model();
    let fields = catalog::descriptors(&model)?;
    trace!(model = model.name(), fields = fields.len(), "document write");
    builder.start_object()?;
    for field in fields {
        builder.field_name(field.name)?;
        match record.get(field.name) {
            None => {
                builder.value_null()?;
            }
            Some(value) => write_value(builder, model, field, value)?,
        }
    }
    builder.end_object()?;
    Ok(builder)
}

fn write_value(
    builder: &mut DocumentBuilder,
    model: ModelRef,
    field: FieldDescriptor,
    value: &Value,
) -> Result<(), ModelError> {
    let mismatch = |found: &Value| ModelError::TypeMismatch {
        model: model.name(),
        field: field.name,
        expected: field.tag.describe(),
        found: found.kind(),
    };
    match (field.tag, value) {
        (TypeTag::Bool, Value::Bool(b)) => {
            builder.value_bool(*b)?;
        }
        (TypeTag::Str, Value::Str(s)) => {
            builder.value_str(s)?;
        }
        (TypeTag::Int, Value::Int(i)) => {
            builder.value_i64(i64::from(*i))?;
        }
        (TypeTag::Long, Value::Long(l)) => {
            builder.value_i64(*l)?;
        }
        (TypeTag::Duration, Value::Duration(d)) => {
            builder.start_object()?;
            builder.field_name("magnitude")?.value_i64(d.magnitude)?;
            builder.field_name("unit")?.value_str(d.unit.name())?;
            builder.end_object()?;
        }
        (TypeTag::CalendarUnit, Value::CalendarUnit(u)) => {
            builder.value_str(u.name())?;
        }
        (TypeTag::TimeZone, Value::TimeZone(z)) => {
            builder.value_str(z.as_str())?;
        }
        (TypeTag::StrList, Value::List(items)) => {
            builder.start_array()?;
            for item in items {
                match item {
                    Value::Str(s) => {
                        builder.value_str(s)?;
                    }
                    other => return Err(mismatch(other)),
                }
            }
            builder.end_array()?;
        }
        (TypeTag::ModelList(nested), Value::List(items)) => {
            builder.start_array()?;
            for item in items {
                match item {
                    Value::Model(record) if record.model() == nested => {
                        write_record(builder, record)?;
                    }
                    other => return Err(mismatch(other)),
                }
            }
            builder.end_array()?;
        }
        (TypeTag::Model(nested), Value::Model(record)) if record.model() == nested => {
            write_record(builder, record)?;
        }
        (_, other) => return Err(mismatch(other)),
    }
    Ok(())
}

/// Parses one model with the default, order-asserting options.
///
/// The parser must be positioned before the object or on its start token.
pub fn parse_document<M: Model>(parser: &mut DocumentParser<'_>) -> Result<M, ModelError> {
    parse_document_with(parser, &DocumentOptions::default())
}

pub fn parse_document_with<M: Model>(
    parser: &mut DocumentParser<'_>,
    options: &DocumentOptions,
) -> Result<M, ModelError> {
    parse_record(parser, ModelRef::of::<M>(), options)?.into_model()
}

/// Parses one object into a [`Record`] of `model`.
pub fn parse_record(
    parser: &mut DocumentParser<'_>,
    model: ModelRef,
    options: &DocumentOptions,
) -> Result<Record, ModelError> {
    let token = match parser.current_token() {
        Some(token) => Some(token),
        None => parser.next_token()?,
    };
    if token != Some(Token::StartObject) {
        return Err(ModelError::NotAnObject {
            model: model.name(),
            found: describe(token),
        });
    }
    DocumentReader { options }.read_object(parser, model, 0)
}

fn describe(token: Option<Token>) -> &'static str {
    token.map_or("end of input", Token::describe)
}

struct DocumentReader<'o> {
    options: &'o DocumentOptions,
}

#[derive(Clone, Copy)]
struct Ctx {
    model: ModelRef,
    field: &'static str,
}

impl Ctx {
    fn invalid(self, reason: impl Into<String>) -> ModelError {
        ModelError::InvalidValue {
            model: self.model.name(),
            field: self.field,
            reason: reason.into(),
        }
    }

    fn mismatch(self, tag: TypeTag, token: Token) -> ModelError {
        ModelError::TypeMismatch {
            model: self.model.name(),
            field: self.field,
            expected: tag.describe(),
            found: token.describe(),
        }
    }
}

impl DocumentReader<'_> {
    /// Reads the fields of an object whose start token is current.
    fn read_object(
        &self,
        parser: &mut DocumentParser<'_>,
        model: ModelRef,
        depth: usize,
    ) -> Result<Record, ModelError> {
        if depth > self.options.max_depth {
            return Err(ModelError::DepthExceeded {
                model: model.name(),
                limit: self.options.max_depth,
            });
        }
        let fields = catalog::descriptors(&model)?;
        trace!(model = model.name(), fields = fields.len(), depth, "document read");
        let entries = match self.options.field_order {
            FieldOrder::Canonical => self.read_canonical(parser, model, &fields, depth)?,
            FieldOrder::ByName => self.read_by_name(parser, model, &fields, depth)?,
        };
        Ok(Record::new(model, entries))
    }

    fn read_canonical(
        &self,
        parser: &mut DocumentParser<'_>,
        model: ModelRef,
        fields: &[FieldDescriptor],
        depth: usize,
    ) -> Result<Vec<(&'static str, Option<Value>)>, ModelError> {
        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let token = parser.next_token()?;
            let found = match token {
                Some(Token::FieldName) => parser.current_name().unwrap_or_default(),
                other => describe(other),
            };
            if token != Some(Token::FieldName) || found != field.name {
                return Err(ModelError::OrderMismatch {
                    model: model.name(),
                    expected: field.name,
                    found: found.to_owned(),
                });
            }
            let ctx = Ctx {
                model,
                field: field.name,
            };
            entries.push((field.name, self.read_value(parser, ctx, field.tag, depth)?));
        }
        match parser.next_token()? {
            Some(Token::EndObject) => Ok(entries),
            Some(Token::FieldName) => Err(ModelError::UnknownField {
                model: model.name(),
                field: parser.current_name().unwrap_or_default().to_owned(),
            }),
            other => Err(DocumentError::UnexpectedToken {
                expected: "end of object",
                found: describe(other),
            }
            .into()),
        }
    }

    fn read_by_name(
        &self,
        parser: &mut DocumentParser<'_>,
        model: ModelRef,
        fields: &[FieldDescriptor],
        depth: usize,
    ) -> Result<Vec<(&'static str, Option<Value>)>, ModelError> {
        let mut values: Vec<Option<Value>> = vec![None; fields.len()];
        let mut seen = vec![false; fields.len()];
        loop {
            match parser.next_token()? {
                Some(Token::EndObject) => break,
                Some(Token::FieldName) => {
                    let name = parser.current_name().unwrap_or_default();
                    let Some(i) = fields.iter().position(|f| f.name == name) else {
                        debug!(model = model.name(), field = name, "skipping unknown document field");
                        parser.next_token()?;
                        parser.skip_children()?;
                        continue;
                    };
                    let ctx = Ctx {
                        model,
                        field: fields[i].name,
                    };
                    if seen[i] {
                        return Err(ctx.invalid("duplicate field"));
                    }
                    seen[i] = true;
                    values[i] = self.read_value(parser, ctx, fields[i].tag, depth)?;
                }
                other => {
                    return Err(DocumentError::UnexpectedToken {
                        expected: "field name",
                        found: describe(other),
                    }
                    .into())
                }
            }
        }
        Ok(fields.iter().map(|f| f.name).zip(values).collect())
    }

    /// Reads the value following a field name; `None` for `null`.
    fn read_value(
        &self,
        parser: &mut DocumentParser<'_>,
        ctx: Ctx,
        tag: TypeTag,
        depth: usize,
    ) -> Result<Option<Value>, ModelError> {
        let token = match parser.next_token()? {
            Some(Token::Null) => return Ok(None),
            Some(token) => token,
            None => return Err(DocumentError::UnexpectedEnd(parser.position()).into()),
        };
        let value = match (tag, token) {
            (TypeTag::Bool, Token::Bool) => Value::Bool(parser.bool_value()?),
            (TypeTag::Str, Token::String) => Value::Str(parser.text()?.to_owned()),
            (TypeTag::Int, Token::Number) => {
                Value::Int(parser.int_value().map_err(|e| ctx.invalid(e.to_string()))?)
            }
            (TypeTag::Long, Token::Number) => {
                Value::Long(parser.long_value().map_err(|e| ctx.invalid(e.to_string()))?)
            }
            (TypeTag::Duration, Token::StartObject) => {
                Value::Duration(self.read_duration(parser, ctx)?)
            }
            (TypeTag::CalendarUnit, Token::String) => {
                let name = parser.text()?;
                Value::CalendarUnit(
                    CalendarUnit::from_name(name)
                        .ok_or_else(|| ctx.invalid(format!("unknown calendar unit `{name}`")))?,
                )
            }
            (TypeTag::TimeZone, Token::String) => Value::TimeZone(
                TimeZoneId::parse(parser.text()?).map_err(|e| ctx.invalid(e.to_string()))?,
            ),
            (TypeTag::StrList, Token::StartArray) => {
                let mut items = Vec::new();
                loop {
                    match parser.next_token()? {
                        Some(Token::EndArray) => break,
                        Some(Token::String) => items.push(Value::Str(parser.text()?.to_owned())),
                        Some(other) => return Err(ctx.mismatch(tag, other)),
                        None => return Err(DocumentError::UnexpectedEnd(parser.position()).into()),
                    }
                }
                Value::List(items)
            }
            (TypeTag::ModelList(nested), Token::StartArray) => {
                let mut items = Vec::new();
                loop {
                    match parser.next_token()? {
                        Some(Token::EndArray) => break,
                        Some(Token::StartObject) => {
                            items.push(Value::Model(self.read_object(parser, nested, depth + 1)?))
                        }
                        Some(other) => return Err(ctx.mismatch(tag, other)),
                        None => return Err(DocumentError::UnexpectedEnd(parser.position()).into()),
                    }
                }
                Value::List(items)
            }
            (TypeTag::Model(nested), Token::StartObject) => {
                Value::Model(self.read_object(parser, nested, depth + 1)?)
            }
            (tag, token) => return Err(ctx.mismatch(tag, token)),
        };
        Ok(Some(value))
    }

    /// Reads `{"magnitude":n,"unit":"NAME"}` whose start token is current.
    fn read_duration(
        &self,
        parser: &mut DocumentParser<'_>,
        ctx: Ctx,
    ) -> Result<DurationValue, ModelError> {
        let mut magnitude = None;
        let mut unit = None;
        loop {
            match parser.next_token()? {
                Some(Token::EndObject) => break,
                Some(Token::FieldName) => {}
                other => {
                    return Err(DocumentError::UnexpectedToken {
                        expected: "field name",
                        found: describe(other),
                    }
                    .into())
                }
            }
            let key = parser.current_name().unwrap_or_default().to_owned();
            let token = parser.next_token()?;
            match (key.as_str(), token) {
                ("magnitude", Some(Token::Number)) => {
                    magnitude = Some(parser.long_value().map_err(|e| ctx.invalid(e.to_string()))?)
                }
                ("unit", Some(Token::String)) => {
                    let name = parser.text()?;
                    unit = Some(
                        DurationUnit::from_name(name)
                            .ok_or_else(|| ctx.invalid(format!("unknown duration unit `{name}`")))?,
                    );
                }
                (key, token) => {
                    return Err(ctx.invalid(format!(
                        "unexpected {} for duration key `{key}`",
                        describe(token)
                    )))
                }
            }
        }
        match (magnitude, unit) {
            (Some(magnitude), Some(unit)) => Ok(DurationValue::new(magnitude, unit)),
            _ => Err(ctx.invalid("duration needs both `magnitude` and `unit`")),
        }
    }
}

/// Renders `model` as a JSON string.
pub fn to_document_string<M: Model>(model: &M) -> Result<String, ModelError> {
    let mut builder = DocumentBuilder::new();
    write_document(&mut builder, model)?;
    Ok(builder.into_string()?)
}

/// Parses a JSON string holding exactly one `M`.
pub fn from_document_str<M: Model>(text: &str) -> Result<M, ModelError> {
    from_document_str_with(text, &DocumentOptions::default())
}

pub fn from_document_str_with<M: Model>(
    text: &str,
    options: &DocumentOptions,
) -> Result<M, ModelError> {
    let mut parser = DocumentParser::new(text);
    let model = parse_document_with(&mut parser, options)?;
    match parser.next_token()? {
        None => Ok(model),
        Some(_) => Err(DocumentError::TrailingData(parser.position()).into()),
    }
}
