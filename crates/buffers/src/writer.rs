//! Auto-growing binary buffer writer.

/// Default initial allocation of a [`Writer`].
const DEFAULT_ALLOC_SIZE: usize = 1024;

/// A binary buffer writer that grows its backing storage on demand.
///
/// Bytes between `x0` and `x` are the pending output; [`Writer::flush`]
/// returns them and moves `x0` forward so the same writer can produce
/// several independent payloads.
///
/// # Example
///
/// ```
/// use model_pack_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(1);
/// writer.i32(-2);
/// assert_eq!(writer.flush(), vec![1, 0xff, 0xff, 0xff, 0xfe]);
/// assert!(writer.flush().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Writer {
    /// Backing storage.
    pub uint8: Vec<u8>,
    /// Start of the unflushed region.
    pub x0: usize,
    /// Current write position.
    pub x: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a writer with the default allocation size.
    pub fn new() -> Self {
        Self::with_alloc_size(DEFAULT_ALLOC_SIZE)
    }

    /// Creates a writer with a custom initial allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0; alloc_size],
            x0: 0,
            x: 0,
        }
    }

    /// Makes sure at least `capacity` more bytes can be written at `x`.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let required = self.x + capacity;
        if required > self.uint8.len() {
            let grown = (self.uint8.len() * 2).max(required);
            self.uint8.resize(grown, 0);
        }
    }

    /// Discards any pending output.
    pub fn reset(&mut self) {
        self.x0 = 0;
        self.x = 0;
    }

    /// Returns the number of pending bytes.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    /// Returns `true` when nothing has been written since the last flush.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the pending bytes without consuming them.
    pub fn pending(&self) -> &[u8] {
        &self.uint8[self.x0..self.x]
    }

    /// Returns the pending bytes and starts a new payload.
    pub fn flush(&mut self) -> Vec<u8> {
        let out = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        out
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.u8(val as u8);
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.buf(&val.to_be_bytes());
    }

    /// Writes a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.buf(&val.to_be_bytes());
    }

    /// Copies raw bytes into the buffer.
    pub fn buf(&mut self, data: &[u8]) {
        let len = data.len();
        self.ensure_capacity(len);
        self.uint8[self.x..self.x + len].copy_from_slice(data);
        self.x += len;
    }

    /// Writes the UTF-8 bytes of a string, returning the number of bytes.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.buf(s.as_bytes());
        s.len()
    }
}
