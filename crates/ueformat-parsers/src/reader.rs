// ueformat-parsers/src/reader.rs
//! Primitive decoders shared by the container reader and the chunk parser.
//!
//! Two read styles exist in the format: sequential reads from an open
//! stream (container envelope only) and offset-indexed reads into the
//! decompressed payload buffer (everything else). All lengths and counts
//! read from a file are untrusted; every buffer read is bounds-checked
//! against the remaining bytes before any copy.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use ueformat_core::{Color4, Vec2, Vec3, Vec4};

use crate::traits::{ParseError, ParseResult};

/// Offset-indexed cursor over an in-memory payload buffer.
///
/// Every read advances the cursor by exactly the bytes it consumed, which
/// is what keeps the declared-size bookkeeping of the chunk protocol exact.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, requested: usize) -> ParseResult<()> {
        if requested > self.remaining() {
            return Err(ParseError::BufferOverflow {
                offset: self.pos,
                requested,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Take `len` raw bytes without copying
    pub fn read_bytes(&mut self, len: usize) -> ParseResult<&'a [u8]> {
        self.check(len)?;
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Advance the cursor by `len` bytes (skip-by-declared-size)
    pub fn skip(&mut self, len: usize) -> ParseResult<()> {
        self.check(len)?;
        self.pos += len;
        Ok(())
    }

    /// Reposition the cursor to an absolute offset (declared-boundary
    /// resynchronization)
    pub fn seek(&mut self, pos: usize) -> ParseResult<()> {
        if pos > self.data.len() {
            return Err(ParseError::BufferOverflow {
                offset: self.pos,
                requested: pos.saturating_sub(self.pos),
                available: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn read_u8(&mut self) -> ParseResult<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> ParseResult<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i32(&mut self) -> ParseResult<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u32(&mut self) -> ParseResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> ParseResult<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a 4-byte signed value that the format uses as a length or
    /// element count. Negative values are a corrupt-file condition.
    pub fn read_len(&mut self) -> ParseResult<usize> {
        let offset = self.pos;
        let value = self.read_i32()?;
        if value < 0 {
            return Err(ParseError::InvalidData {
                offset,
                message: format!("negative length or count: {value}"),
            });
        }
        Ok(value as usize)
    }

    /// Length-prefixed string: 4-byte signed length followed by that many
    /// raw bytes, no terminator. The format does not validate encoding, so
    /// decoding is lossy.
    pub fn read_string(&mut self) -> ParseResult<String> {
        let len = self.read_len()?;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .to_string())
    }

    pub fn read_vec2(&mut self) -> ParseResult<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> ParseResult<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec4(&mut self) -> ParseResult<Vec4> {
        Ok(Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    pub fn read_color4(&mut self) -> ParseResult<Color4> {
        let bytes = self.read_bytes(4)?;
        Ok(Color4::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Sequential little-endian i32 from an open stream (container envelope)
pub fn read_i32_stream<R: Read>(reader: &mut R) -> ParseResult<i32> {
    Ok(reader.read_i32::<LittleEndian>()?)
}

/// Sequential length-prefixed string from an open stream
pub fn read_string_stream<R: Read>(reader: &mut R) -> ParseResult<String> {
    let len = read_i32_stream(reader)?;
    if len < 0 {
        return Err(ParseError::InvalidData {
            offset: 0,
            message: format!("negative string length: {len}"),
        });
    }
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes)
        .trim_end_matches('\0')
        .to_string())
}

/// Sequential fixed-size byte block from an open stream
pub fn read_exact_stream<R: Read>(reader: &mut R, len: usize) -> ParseResult<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}
