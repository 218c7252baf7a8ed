//! Binary codec: flat, name-free, order-dependent model encoding.
//!
//! Each catalog field is written as a one-byte presence flag followed, when
//! present, by its value. Field names never hit the wire, so a payload is
//! only readable by a decoder whose catalog matches the encoder's.
//!
//! Primitive layout (big-endian):
//!
//! | tag               | encoding                                         |
//! |-------------------|--------------------------------------------------|
//! | bool / presence   | one byte, `0` or `1`                             |
//! | int               | 4 bytes                                          |
//! | long              | 8 bytes                                          |
//! | string            | vint byte length + UTF-8                         |
//! | duration          | zig-zag vlong magnitude + one byte unit ordinal  |
//! | calendar unit     | vint ordinal                                     |
//! | time zone         | string                                           |
//! | list of strings   | vint count + strings                             |
//! | list of models    | 4-byte count + models                            |
//! | model             | the nested model's fields, unframed              |

use model_pack_buffers::{BufferError, Reader, Writer};
use tracing::trace;

use crate::catalog;
use crate::dispatch::TypeTag;
use crate::error::ModelError;
use crate::model::{Model, ModelRef};
use crate::units::{CalendarUnit, DurationUnit, DurationValue, TimeZoneId};
use crate::value::{Record, Value};

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOptions {
    /// Maximum model nesting depth; the root model is depth 0.
    pub max_depth: usize,
    /// Maximum element count of a list and byte length of a string.
    pub max_collection_len: usize,
}

impl Default for BinaryOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_collection_len: 1 << 20,
        }
    }
}

/// Writes models into a [`Writer`].
pub struct BinaryEncoder {
    pub writer: Writer,
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    pub fn with_writer(writer: Writer) -> Self {
        Self { writer }
    }

    /// Encodes one model and returns its bytes.
    ///
    /// Starts a fresh payload: bytes still pending in the writer are
    /// discarded. Use [`BinaryEncoder::write_model`] to append to them.
    pub fn encode<M: Model>(&mut self, model: &M) -> Result<Vec<u8>, ModelError> {
        self.writer.reset();
        let written = self.write_model(model);
        let bytes = self.writer.flush();
        written.map(|()| bytes)
    }

    pub fn write_model<M: Model>(&mut self, model: &M) -> Result<(), ModelError> {
        self.write_record(&Record::capture(model))
    }

    pub fn write_record(&mut self, record: &Record) -> Result<(), ModelError> {
        let model = record.model();
        let fields = catalog::descriptors(&model)?;
        trace!(model = model.name(), fields = fields.len(), "binary write");
        for field in fields {
            match record.get(field.name) {
                None => self.write_bool(false),
                Some(value) => {
                    self.write_bool(true);
                    self.write_value(model, field.name, field.tag, value)?;
                }
            }
        }
        Ok(())
    }

    fn write_value(
        &mut self,
        model: ModelRef,
        field: &'static str,
        tag: TypeTag,
        value: &Value,
    ) -> Result<(), ModelError> {
        let mismatch = |found: &Value| ModelError::TypeMismatch {
            model: model.name(),
            field,
            expected: tag.describe(),
            found: found.kind(),
        };
        match (tag, value) {
            (TypeTag::Bool, Value::Bool(b)) => self.write_bool(*b),
            (TypeTag::Str, Value::Str(s)) => self.write_str(s)?,
            (TypeTag::Int, Value::Int(i)) => self.writer.i32(*i),
            (TypeTag::Long, Value::Long(l)) => self.writer.i64(*l),
            (TypeTag::Duration, Value::Duration(d)) => {
                self.write_zlong(d.magnitude);
                self.writer.u8(d.unit.ordinal() as u8);
            }
            (TypeTag::CalendarUnit, Value::CalendarUnit(u)) => self.write_vint(u.ordinal()),
            (TypeTag::TimeZone, Value::TimeZone(z)) => self.write_str(z.as_str())?,
            (TypeTag::StrList, Value::List(items)) => {
                self.write_len(items.len())?;
                for item in items {
                    match item {
                        Value::Str(s) => self.write_str(s)?,
                        other => return Err(mismatch(other)),
                    }
                }
            }
            (TypeTag::ModelList(nested), Value::List(items)) => {
                let len = i32::try_from(items.len()).map_err(|_| BufferError::Overflow)?;
                self.writer.i32(len);
                for item in items {
                    match item {
                        Value::Model(record) if record.model() == nested => {
                            self.write_record(record)?
                        }
                        other => return Err(mismatch(other)),
                    }
                }
            }
            (TypeTag::Model(nested), Value::Model(record)) if record.model() == nested => {
                self.write_record(record)?
            }
            (_, other) => return Err(mismatch(other)),
        }
        Ok(())
    }

    pub fn write_bool(&mut self, b: bool) {
        self.writer.u8(b as u8);
    }

    /// Variable-length unsigned int, 7 bits per byte, low bits first.
    pub fn write_vint(&mut self, mut i: u32) {
        while i & !0x7f != 0 {
            self.writer.u8(((i & 0x7f) | 0x80) as u8);
            i >>= 7;
        }
        self.writer.u8(i as u8);
    }

    pub fn write_vlong(&mut self, mut l: u64) {
        while l & !0x7f != 0 {
            self.writer.u8(((l & 0x7f) | 0x80) as u8);
            l >>= 7;
        }
        self.writer.u8(l as u8);
    }

    /// Zig-zag encoded variable-length signed long.
    pub fn write_zlong(&mut self, l: i64) {
        self.write_vlong(((l << 1) ^ (l >> 63)) as u64);
    }

    /// Length prefix as a vint; lengths past `u32::MAX` do not fit.
    pub fn write_len(&mut self, len: usize) -> Result<(), BufferError> {
        let len = u32::try_from(len).map_err(|_| BufferError::Overflow)?;
        self.write_vint(len);
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), BufferError> {
        self.write_len(s.len())?;
        self.writer.utf8(s);
        Ok(())
    }
}

/// Reads models out of a [`Reader`].
#[derive(Debug, Clone, Default)]
pub struct BinaryDecoder {
    pub options: BinaryOptions,
}

impl BinaryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BinaryOptions) -> Self {
        Self { options }
    }

    /// Decodes one model that must span all of `data`.
    pub fn decode<M: Model>(&self, data: &[u8]) -> Result<M, ModelError> {
        let mut reader = Reader::new(data);
        let model = self.read_model::<M>(&mut reader)?;
        if !reader.is_eof() {
            return Err(ModelError::InvalidValue {
                model: M::NAME,
                field: "",
                reason: format!("{} trailing bytes", reader.size()),
            });
        }
        Ok(model)
    }

    pub fn read_model<M: Model>(&self, reader: &mut Reader<'_>) -> Result<M, ModelError> {
        self.read_record(reader, ModelRef::of::<M>())?.into_model()
    }

    pub fn read_record(
        &self,
        reader: &mut Reader<'_>,
        model: ModelRef,
    ) -> Result<Record, ModelError> {
        self.read_record_at(reader, model, 0)
    }

    fn read_record_at(
        &self,
        reader: &mut Reader<'_>,
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
        trace!(model = model.name(), fields = fields.len(), depth, "binary read");
        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let ctx = Ctx {
                model,
                field: field.name,
            };
            let value = if self.read_bool(reader, ctx)? {
                Some(self.read_value(reader, ctx, field.tag, depth)?)
            } else {
                None
            };
            entries.push((field.name, value));
        }
        Ok(Record::new(model, entries))
    }

    fn read_value(
        &self,
        reader: &mut Reader<'_>,
        ctx: Ctx,
        tag: TypeTag,
        depth: usize,
    ) -> Result<Value, ModelError> {
        Ok(match tag {
            TypeTag::Bool => Value::Bool(self.read_bool(reader, ctx)?),
            TypeTag::Str => Value::Str(self.read_str(reader, ctx)?),
            TypeTag::Int => Value::Int(reader.i32()?),
            TypeTag::Long => Value::Long(reader.i64()?),
            TypeTag::Duration => {
                let magnitude = self.read_zlong(reader, ctx)?;
                let ordinal = reader.u8()?;
                let unit = DurationUnit::from_ordinal(ordinal as u32)
                    .ok_or_else(|| ctx.invalid(format!("unknown duration unit {ordinal}")))?;
                Value::Duration(DurationValue::new(magnitude, unit))
            }
            TypeTag::CalendarUnit => {
                let ordinal = self.read_vint(reader, ctx)?;
                let unit = CalendarUnit::from_ordinal(ordinal)
                    .ok_or_else(|| ctx.invalid(format!("unknown calendar unit {ordinal}")))?;
                Value::CalendarUnit(unit)
            }
            TypeTag::TimeZone => {
                let id = self.read_str(reader, ctx)?;
                Value::TimeZone(TimeZoneId::parse(&id).map_err(|e| ctx.invalid(e.to_string()))?)
            }
            TypeTag::StrList => {
                let len = self.read_len(ctx, self.read_vint(reader, ctx)? as usize)?;
                let mut items = Vec::with_capacity(len.min(reader.size()));
                for _ in 0..len {
                    items.push(Value::Str(self.read_str(reader, ctx)?));
                }
                Value::List(items)
            }
            TypeTag::ModelList(nested) => {
                let raw = reader.i32()?;
                let len = usize::try_from(raw)
                    .map_err(|_| ctx.invalid(format!("negative list length {raw}")))?;
                let len = self.read_len(ctx, len)?;
                let mut items = Vec::with_capacity(len.min(reader.size()));
                for _ in 0..len {
                    items.push(Value::Model(self.read_record_at(reader, nested, depth + 1)?));
                }
                Value::List(items)
            }
            TypeTag::Model(nested) => Value::Model(self.read_record_at(reader, nested, depth + 1)?),
        })
    }

    fn read_len(&self, ctx: Ctx, len: usize) -> Result<usize, ModelError> {
        if len > self.options.max_collection_len {
            return Err(ModelError::LengthExceeded {
                model: ctx.model.name(),
                field: ctx.field,
                len,
                limit: self.options.max_collection_len,
            });
        }
        Ok(len)
    }

    fn read_bool(&self, reader: &mut Reader<'_>, ctx: Ctx) -> Result<bool, ModelError> {
        match reader.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ctx.invalid(format!("unexpected boolean byte {other:#04x}"))),
        }
    }

    fn read_vint(&self, reader: &mut Reader<'_>, ctx: Ctx) -> Result<u32, ModelError> {
        let mut result: u32 = 0;
        for shift in (0..35).step_by(7) {
            let b = reader.u8()?;
            if shift == 28 && b & 0xf0 != 0 {
                return Err(ctx.invalid("vint overflows 32 bits"));
            }
            result |= ((b & 0x7f) as u32) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ctx.invalid("vint longer than 5 bytes"))
    }

    fn read_vlong(&self, reader: &mut Reader<'_>, ctx: Ctx) -> Result<u64, ModelError> {
        let mut result: u64 = 0;
        for shift in (0..70).step_by(7) {
            let b = reader.u8()?;
            if shift == 63 && b & 0xfe != 0 {
                return Err(ctx.invalid("vlong overflows 64 bits"));
            }
            result |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ctx.invalid("vlong longer than 10 bytes"))
    }

    fn read_zlong(&self, reader: &mut Reader<'_>, ctx: Ctx) -> Result<i64, ModelError> {
        let raw = self.read_vlong(reader, ctx)?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    fn read_str(&self, reader: &mut Reader<'_>, ctx: Ctx) -> Result<String, ModelError> {
        let len = self.read_len(ctx, self.read_vint(reader, ctx)? as usize)?;
        Ok(reader.utf8(len)?.to_owned())
    }
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
}

/// Appends the binary form of `model` to `writer`.
pub fn write_binary<M: Model>(writer: &mut Writer, model: &M) -> Result<(), ModelError> {
    let mut encoder = BinaryEncoder::with_writer(std::mem::take(writer));
    let written = encoder.write_model(model);
    *writer = encoder.writer;
    written
}

/// Reads one model from the current position of `reader`.
pub fn read_binary<M: Model>(reader: &mut Reader<'_>) -> Result<M, ModelError> {
    BinaryDecoder::new().read_model(reader)
}

pub fn to_bytes<M: Model>(model: &M) -> Result<Vec<u8>, ModelError> {
    BinaryEncoder::new().encode(model)
}

pub fn from_bytes<M: Model>(data: &[u8]) -> Result<M, ModelError> {
    BinaryDecoder::new().decode(data)
}
