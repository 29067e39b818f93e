use std::borrow::Cow;

/// Cursor over a binary buffer. Reads past the end of the buffer are
/// truncated (`read_bytes`) or zero filled (the numeric helpers), so callers
/// that care about truncation must check [`Deserializer::remaining`] first.
#[rustfmt::skip]
pub trait Deserializer {
    fn pos(&mut self) -> usize;
    fn size(&mut self) -> usize;
    fn advance_by(&mut self, amount: usize);
    fn jump_to(&mut self, pos: usize);
    fn read_bytes(&mut self, length: usize) -> Cow<'_, [u8]>;

    fn remaining(&mut self) -> usize {
        let (pos, size) = (self.pos(), self.size());
        size.saturating_sub(pos)
    }

    fn read_array<const LENGTH: usize>(&mut self) -> [u8; LENGTH] {
        let bytes = self.read_bytes(LENGTH);
        let mut out = [0; LENGTH];
        out[..bytes.len()].copy_from_slice(&bytes);
        out
    }

    fn read_u32_le(&mut self) -> u32 { u32::from_le_bytes(self.read_array()) }
    fn read_f32_le(&mut self) -> f32 { f32::from_le_bytes(self.read_array()) }
}

pub struct SliceDeserializer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> SliceDeserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }

    pub fn read_slice(&mut self, length: usize) -> &'a [u8] {
        let start = self.offset.min(self.buffer.len());
        let end = self.offset.saturating_add(length).min(self.buffer.len());
        self.offset = self.offset.saturating_add(length);
        &self.buffer[start..end]
    }
}

impl Deserializer for SliceDeserializer<'_> {
    fn pos(&mut self) -> usize {
        self.offset
    }

    fn size(&mut self) -> usize {
        self.buffer.len()
    }

    fn advance_by(&mut self, amount: usize) {
        self.offset = self.offset.saturating_add(amount);
    }

    fn jump_to(&mut self, pos: usize) {
        self.offset = pos;
    }

    fn read_bytes(&mut self, length: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.read_slice(length))
    }
}
