use bytes::{BufMut, BytesMut};

/// A single typed field of an extension payload.
///
/// The daemon describes extension layouts with pack-style format
/// characters; the two in use are `L` (4-byte little-endian word) and
/// `C` (raw byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionField {
    /// 4-byte little-endian word (format char `L`).
    Word(u32),
    /// Single raw byte (format char `C`).
    Byte(u8),
}

impl ExtensionField {
    /// Format character describing this field.
    pub const fn format_char(self) -> char {
        match self {
            ExtensionField::Word(_) => 'L',
            ExtensionField::Byte(_) => 'C',
        }
    }

    /// Packed width in bytes.
    pub const fn width(self) -> usize {
        match self {
            ExtensionField::Word(_) => 4,
            ExtensionField::Byte(_) => 1,
        }
    }
}

/// A typed, packed extension payload appended to a request header.
///
/// Equality compares field kind plus value, element-wise: two extensions
/// are equal iff their format strings and their values both match. This
/// carries the frame-equality contract the protocol-compliance tests
/// depend on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extension {
    fields: Vec<ExtensionField>,
}

impl Extension {
    /// Create an empty extension.
    pub fn new() -> Self {
        Self::default()
    }

    /// An extension of consecutive `L` words.
    pub fn words<I: IntoIterator<Item = u32>>(values: I) -> Self {
        Self {
            fields: values.into_iter().map(ExtensionField::Word).collect(),
        }
    }

    /// An extension of consecutive `C` bytes.
    pub fn data(values: impl AsRef<[u8]>) -> Self {
        Self {
            fields: values
                .as_ref()
                .iter()
                .copied()
                .map(ExtensionField::Byte)
                .collect(),
        }
    }

    /// Append a word field.
    pub fn push_word(&mut self, value: u32) {
        self.fields.push(ExtensionField::Word(value));
    }

    /// Append a byte field.
    pub fn push_byte(&mut self, value: u8) {
        self.fields.push(ExtensionField::Byte(value));
    }

    /// The fields in packing order.
    pub fn fields(&self) -> &[ExtensionField] {
        &self.fields
    }

    /// True when the extension carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The pack-style format string, e.g. `"LLLLL"`.
    pub fn format(&self) -> String {
        self.fields.iter().map(|f| f.format_char()).collect()
    }

    /// Total packed byte length.
    ///
    /// Always equal to the length implied by [`format`](Self::format) —
    /// the typed field model cannot express a mismatch.
    pub fn packed_len(&self) -> usize {
        self.fields.iter().map(|f| f.width()).sum()
    }

    /// Append the packed bytes to `dst`.
    pub fn pack(&self, dst: &mut BytesMut) {
        dst.reserve(self.packed_len());
        for field in &self.fields {
            match *field {
                ExtensionField::Word(value) => dst.put_u32_le(value),
                ExtensionField::Byte(value) => dst.put_u8(value),
            }
        }
    }
}
