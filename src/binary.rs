use byteorder::{ByteOrder, LittleEndian};

use crate::buffer::DataBuffer;
use crate::common::*;
use crate::config::Limits;
use crate::error::{Error, Result};
use crate::proto::Protocol;


// declared lengths are trusted only this far ahead of the bytes actually read.
const READ_CHUNK: usize = 64 * 1024;


/// Compact binary wire format.
///
/// Byte is a raw byte; I16/I32/I64 are zigzag varints; Float/Double are
/// little-endian IEEE-754; Binary and String are varint length prefixed.
/// Struct boundaries take no bytes.
pub struct BinaryProtocol<B> {
    buffer: B,
    limits: Limits,
    depth:  usize,
}

impl<B: DataBuffer> BinaryProtocol<B> {
    pub fn new(buffer: B) -> BinaryProtocol<B> {
        BinaryProtocol::with_limits(buffer, Limits::default())
    }

    pub fn with_limits(buffer: B, limits: Limits) -> BinaryProtocol<B> {
        BinaryProtocol { buffer, limits, depth: 0 }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }


    fn read_all(&mut self, dest: &mut [u8]) -> Result<()> {
        let count = self.buffer.read(dest)?;
        if count < dest.len() {
            return Err(Error::EndOfBuffer);
        }
        Ok(())
    }

    fn write_all(&mut self, src: &[u8]) -> Result<()> {
        self.buffer.write(src)
    }

    fn next_u8(&mut self) -> Result<u8> {
        let mut byte = [0; 1];
        self.read_all(&mut byte)?;
        Ok(byte[0])
    }

    fn write_varint(&mut self, value: u64) -> Result<()> {
        let (bytes, length) = encode_varint(value);
        self.write_all(&bytes[..length])
    }

    fn read_varint(&mut self, bits: u32) -> Result<u64> {
        decode_varint(bits, || self.next_u8())
    }
}

impl<B: DataBuffer> Protocol for BinaryProtocol<B> {
    fn limits(&self) -> Limits {
        self.limits
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.limits.check_depth(self.depth + 1)?;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn write_packed(&mut self, value: u32) -> Result<()> {
        self.write_varint(value as u64)
    }

    fn read_packed(&mut self) -> Result<u32> {
        Ok(self.read_varint(32)? as u32)
    }


    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_all(&[value as u8])
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_varint(zigzag_encode_i16(value) as u64)
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_varint(zigzag_encode_i32(value) as u64)
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_varint(zigzag_encode_i64(value))
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        let mut bytes = [0; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.write_all(&bytes)
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        let mut bytes = [0; 8];
        LittleEndian::write_f64(&mut bytes, value);
        self.write_all(&bytes)
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<()> {
        self.write_varint(value.len() as u64)?;
        self.write_all(value)
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_binary(value.as_bytes())
    }


    fn read_byte(&mut self) -> Result<i8> {
        Ok(self.next_u8()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(zigzag_decode_i16(self.read_varint(16)? as u16))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(zigzag_decode_i32(self.read_varint(32)? as u32))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(zigzag_decode_i64(self.read_varint(64)?))
    }

    fn read_float(&mut self) -> Result<f32> {
        let mut bytes = [0; 4];
        self.read_all(&mut bytes)?;
        Ok(LittleEndian::read_f32(&bytes))
    }

    fn read_double(&mut self) -> Result<f64> {
        let mut bytes = [0; 8];
        self.read_all(&mut bytes)?;
        Ok(LittleEndian::read_f64(&bytes))
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        let length = self.read_varint(32)?;
        let length = self.limits.check_binary_len(length)?;
        let mut bytes = Vec::with_capacity(length.min(READ_CHUNK));
        while bytes.len() < length {
            let start = bytes.len();
            bytes.resize(length.min(start + READ_CHUNK), 0);
            self.read_all(&mut bytes[start..])?;
        }
        Ok(bytes)
    }

    fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }
}
