//! Reusable binary reader/writer pair bound to a single model type.
//!
//! Request and response types that own their own framing hold a
//! `ModelCodec` and delegate the model part of their payload to it.

use std::marker::PhantomData;

use model_pack_buffers::{Reader, Writer};

use crate::binary::{BinaryDecoder, BinaryEncoder, BinaryOptions};
use crate::dispatch;
use crate::error::ModelError;
use crate::model::{Model, ModelRef};

/// Reads a `T` from a binary stream.
pub trait StreamReader<T> {
    fn read(&self, reader: &mut Reader<'_>) -> Result<T, ModelError>;
}

/// Writes a `T` to a binary stream.
pub trait StreamWriter<T> {
    fn write(&self, writer: &mut Writer, value: &T) -> Result<(), ModelError>;
}

/// Binary codec for `M`.
///
/// Construction dispatches the whole model graph up front, so a model with
/// an unsupported field is rejected before any bytes are produced.
#[derive(Debug, Clone)]
pub struct ModelCodec<M> {
    decoder: BinaryDecoder,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> ModelCodec<M> {
    pub fn new() -> Result<Self, ModelError> {
        Self::with_options(BinaryOptions::default())
    }

    pub fn with_options(options: BinaryOptions) -> Result<Self, ModelError> {
        dispatch::validate(&ModelRef::of::<M>())?;
        Ok(Self {
            decoder: BinaryDecoder::with_options(options),
            _model: PhantomData,
        })
    }

    pub fn options(&self) -> &BinaryOptions {
        &self.decoder.options
    }

    pub fn to_bytes(&self, model: &M) -> Result<Vec<u8>, ModelError> {
        BinaryEncoder::new().encode(model)
    }

    pub fn from_bytes(&self, data: &[u8]) -> Result<M, ModelError> {
        self.decoder.decode(data)
    }
}

impl<M: Model> StreamReader<M> for ModelCodec<M> {
    fn read(&self, reader: &mut Reader<'_>) -> Result<M, ModelError> {
        self.decoder.read_model(reader)
    }
}

impl<M: Model> StreamWriter<M> for ModelCodec<M> {
    fn write(&self, writer: &mut Writer, value: &M) -> Result<(), ModelError> {
        crate::binary::write_binary(writer, value)
    }
}
