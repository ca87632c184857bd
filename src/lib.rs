pub mod wire_type;
pub mod error;
pub mod common;
pub mod reader;
pub mod header;
pub mod config;
pub mod proto;
pub mod buffer;
pub mod binary;
pub mod text;
pub mod descriptor;
pub mod schema;
pub mod encoder;
pub mod decoder;


pub use wire_type::*;
pub use error::{Error, Result};
pub use header::{FieldHeader, ListHeader, MapHeader, MAX_PACKED_VALUE};
pub use config::Limits;
pub use proto::Protocol;
pub use buffer::{DataBuffer, TextBuffer, MemoryBuffer, MemoryTextBuffer};
pub use binary::BinaryProtocol;
pub use text::TextProtocol;
pub use descriptor::{TypeDescriptor, ValueRef, Wire, SchemaFn};
pub use schema::{FieldDescriptor, StructSchema, StructSchemaBuilder, StructValue, Message};


use log::warn;
use reader::Reader;


pub fn encode_to_bytes<T: Wire>(value: &T) -> Result<Vec<u8>> {
    let mut proto = BinaryProtocol::new(vec![]);
    encoder::write(&mut proto, value, &T::descriptor())?;
    Ok(proto.into_inner())
}

/// Decodes one value from the start of `data`. Bytes after the value are
/// ignored; use [`validate`] to reject them.
pub fn decode_from_bytes<T: Wire>(data: &[u8]) -> Result<T> {
    let mut proto = BinaryProtocol::new(Reader::new(data));
    T::decode(&T::descriptor(), &mut proto)
}

pub fn decode_from_window<T: Wire>(data: &[u8], offset: usize, length: usize) -> Result<T> {
    let window = offset.checked_add(length)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::EndOfBuffer)?;
    decode_from_bytes(window)
}

pub fn encode_to_text<T: Wire>(value: &T) -> Result<String> {
    let mut proto = TextProtocol::new(MemoryTextBuffer::new());
    encoder::write(&mut proto, value, &T::descriptor())?;
    Ok(proto.into_inner().to_text())
}

pub fn decode_from_text<T: Wire>(text: &str) -> Result<T> {
    let mut proto = TextProtocol::new(MemoryTextBuffer::parse(text));
    T::decode(&T::descriptor(), &mut proto)
}

/// Appends the binary encoding of `value` to a caller-supplied buffer.
pub fn encode_into<T: Wire, B: DataBuffer>(value: &T, buffer: &mut B) -> Result<()> {
    let mut proto = BinaryProtocol::new(buffer);
    encoder::write(&mut proto, value, &T::descriptor())
}

/// Reads the next value from a caller-supplied buffer, leaving it
/// positioned after that value.
pub fn decode_from<T: Wire, B: DataBuffer>(buffer: &mut B) -> Result<T> {
    let mut proto = BinaryProtocol::new(buffer);
    T::decode(&T::descriptor(), &mut proto)
}

pub fn decode_or_none<T: Wire>(data: &[u8]) -> Option<T> {
    match decode_from_bytes(data) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("decode of {} bytes failed: {}", data.len(), e);
            None
        },
    }
}

pub fn decode_from_or_none<T: Wire, B: DataBuffer>(buffer: &mut B) -> Option<T> {
    match decode_from(buffer) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("decode from buffer failed: {}", e);
            None
        },
    }
}


/// Checks that `data` holds exactly one well-formed struct, without any
/// schema.
pub fn validate(data: &[u8]) -> Result<()> {
    let mut proto = BinaryProtocol::new(Reader::new(data));
    decoder::skip(&mut proto, WireType::Struct)?;
    if proto.buffer().has_some() {
        return Err(Error::TrailingData);
    }
    Ok(())
}

/// Schema-less view of a binary struct. See [`decoder::read_dynamic`].
pub fn inspect(data: &[u8]) -> Result<serde_json::Value> {
    let mut proto = BinaryProtocol::new(Reader::new(data));
    let value = decoder::read_dynamic(&mut proto, WireType::Struct)?;
    if proto.buffer().has_some() {
        return Err(Error::TrailingData);
    }
    Ok(value)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_out_of_range() {
        let data = [84u8];
        assert_eq!(decode_from_window::<i32>(&data, 0, 1), Ok(42));
        assert_eq!(decode_from_window::<i32>(&data, 1, 1), Err(Error::EndOfBuffer));
        assert_eq!(decode_from_window::<i32>(&data, usize::MAX, 2), Err(Error::EndOfBuffer));
    }

    #[test]
    fn buffer_round_trip_in_sequence() {
        let mut buffer = MemoryBuffer::new();
        encode_into(&7i64, &mut buffer).unwrap();
        encode_into(&"x".to_string(), &mut buffer).unwrap();
        assert_eq!(buffer.as_slice(), [14, 1, b'x']);
        assert_eq!(decode_from::<i64, _>(&mut buffer), Ok(7));
        assert_eq!(decode_from::<String, _>(&mut buffer), Ok("x".into()));
        assert_eq!(decode_from_or_none::<i32, _>(&mut buffer), None);

        let mut buffer = MemoryBuffer::from_vec(vec![84, 0xff]);
        assert_eq!(decode_from::<i32, _>(&mut buffer), Ok(42));
        assert_eq!(buffer.remaining(), 1);
        assert_eq!(buffer.into_vec(), [84, 0xff]);
    }

    #[test]
    fn non_throwing_decode() {
        assert_eq!(decode_or_none::<i16>(&[]), None);
        assert_eq!(decode_or_none::<i16>(&[3]), Some(-2));
    }

    #[test]
    fn validate_rejects_trailing_bytes() {
        assert_eq!(validate(&[0x01]), Ok(()));
        assert_eq!(validate(&[0x01, 0x00]), Err(Error::TrailingData));
        assert_eq!(validate(&[0x15]), Err(Error::EndOfBuffer));
    }
}
