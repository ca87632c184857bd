use std::str::FromStr;

use crate::buffer::TextBuffer;
use crate::config::Limits;
use crate::error::{Error, Result};
use crate::proto::Protocol;


/// Human-inspectable token format. Every primitive and every packed header
/// integer is one decimal token; integers carry their sign directly instead
/// of zigzag. Binary payloads are not supported.
pub struct TextProtocol<T> {
    buffer: T,
    limits: Limits,
    depth:  usize,
}

impl<T: TextBuffer> TextProtocol<T> {
    pub fn new(buffer: T) -> TextProtocol<T> {
        TextProtocol::with_limits(buffer, Limits::default())
    }

    pub fn with_limits(buffer: T, limits: Limits) -> TextProtocol<T> {
        TextProtocol { buffer, limits, depth: 0 }
    }

    pub fn buffer(&self) -> &T {
        &self.buffer
    }

    pub fn into_inner(self) -> T {
        self.buffer
    }


    fn read_text(&mut self) -> Result<String> {
        self.buffer.read_token()?.ok_or(Error::EndOfBuffer)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.buffer.write_token(text)
    }

    fn read_number<N: FromStr>(&mut self, expected: &'static str) -> Result<N> {
        let token = self.read_text()?;
        token.parse().map_err(|_| Error::InvalidToken { token, expected })
    }
}

fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".into()
    }
    else if value == f64::INFINITY {
        "Infinity".into()
    }
    else if value == f64::NEG_INFINITY {
        "-Infinity".into()
    }
    else {
        value.to_string()
    }
}

impl<T: TextBuffer> Protocol for TextProtocol<T> {
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

    // packed values travel as signed 32-bit decimals.
    fn write_packed(&mut self, value: u32) -> Result<()> {
        self.write_text(&(value as i32).to_string())
    }

    fn read_packed(&mut self) -> Result<u32> {
        Ok(self.read_number::<i32>("32-bit integer")? as u32)
    }


    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_text(&value.to_string())
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_text(&value.to_string())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_text(&value.to_string())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_text(&value.to_string())
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_double(value as f64)
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_text(&format_double(value))
    }

    fn write_binary(&mut self, _value: &[u8]) -> Result<()> {
        Err(Error::NotImplemented("binary payloads in the text protocol"))
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_text(value)
    }


    fn read_byte(&mut self) -> Result<i8> {
        self.read_number("8-bit integer")
    }

    fn read_i16(&mut self) -> Result<i16> {
        self.read_number("16-bit integer")
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.read_number("32-bit integer")
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.read_number("64-bit integer")
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(self.read_double()? as f32)
    }

    fn read_double(&mut self) -> Result<f64> {
        self.read_number("decimal number")
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        Err(Error::NotImplemented("binary payloads in the text protocol"))
    }

    fn read_string(&mut self) -> Result<String> {
        self.read_text()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryTextBuffer;
    use crate::header::{FieldHeader, MapHeader};
    use crate::wire_type::WireType;

    fn written<F: FnOnce(&mut TextProtocol<MemoryTextBuffer>) -> Result<()>>(f: F) -> String {
        let mut proto = TextProtocol::new(MemoryTextBuffer::new());
        f(&mut proto).unwrap();
        proto.into_inner().to_text()
    }

    fn reading(text: &str) -> TextProtocol<MemoryTextBuffer> {
        TextProtocol::new(MemoryTextBuffer::parse(text))
    }

    #[test]
    fn integers_keep_their_sign() {
        assert_eq!(written(|p| { p.write_i32(-42)?; p.write_i64(7)?; p.write_byte(-1) }), "-42;7;-1");

        let mut proto = reading("-42;7;-1");
        assert_eq!(proto.read_i32().unwrap(), -42);
        assert_eq!(proto.read_i64().unwrap(), 7);
        assert_eq!(proto.read_byte().unwrap(), -1);
    }

    #[test]
    fn headers_are_decimal_packed_values() {
        let text = written(|p| {
            p.write_field_begin(FieldHeader::new(2, WireType::String))?;
            p.write_map_begin(MapHeader::new(1, WireType::I32, WireType::List)?)?;
            p.write_field_stop()
        });
        assert_eq!(text, "42;1;-43;1");

        let mut proto = reading(&text);
        assert_eq!(proto.read_field_begin().unwrap(), FieldHeader::new(2, WireType::String));
        assert_eq!(proto.read_map_begin().unwrap(), MapHeader::new(1, WireType::I32, WireType::List).unwrap());
        assert!(proto.read_field_begin().unwrap().is_stop());
    }

    #[test]
    fn large_packed_values_are_signed() {
        use crate::header::MAX_PACKED_VALUE;

        let header = FieldHeader::new(MAX_PACKED_VALUE, WireType::String);
        let text = written(|p| p.write_field_begin(header));
        assert_eq!(text, "-6");
        assert_eq!(reading(&text).read_field_begin().unwrap(), header);

        assert!(matches!(reading("4294967290").read_field_begin(), Err(Error::InvalidToken { .. })));
    }

    #[test]
    fn bool_is_a_byte_token() {
        assert_eq!(written(|p| { p.write_bool(true)?; p.write_bool(false) }), "1;0");
        let mut proto = reading("1;0;7");
        assert!(proto.read_bool().unwrap());
        assert!(!proto.read_bool().unwrap());
        assert!(!proto.read_bool().unwrap());
    }

    #[test]
    fn floats_are_promoted_to_double_text() {
        assert_eq!(written(|p| p.write_float(1.5)), "1.5");
        assert_eq!(written(|p| p.write_double(-0.25)), "-0.25");
        assert_eq!(written(|p| p.write_double(f64::INFINITY)), "Infinity");

        let mut proto = reading("0.1;Infinity;NaN;1.0E3");
        assert_eq!(proto.read_float().unwrap(), 0.1f32);
        assert_eq!(proto.read_double().unwrap(), f64::INFINITY);
        assert!(proto.read_double().unwrap().is_nan());
        assert_eq!(proto.read_double().unwrap(), 1000.0);
    }

    #[test]
    fn strings_are_raw_tokens() {
        let text = written(|p| p.write_string("a;b\\c"));
        assert_eq!(text, "a\\;b\\\\c");
        assert_eq!(reading(&text).read_string().unwrap(), "a;b\\c");
    }

    #[test]
    fn binary_is_not_implemented() {
        let mut proto = TextProtocol::new(MemoryTextBuffer::new());
        assert!(matches!(proto.write_binary(b"x"), Err(Error::NotImplemented(_))));
        assert!(matches!(proto.read_binary(), Err(Error::NotImplemented(_))));
    }

    #[test]
    fn bad_tokens_and_end_of_buffer() {
        let mut proto = reading("abc");
        assert_eq!(
            proto.read_i32(),
            Err(Error::InvalidToken { token: "abc".into(), expected: "32-bit integer" }));
        assert_eq!(proto.read_i32(), Err(Error::EndOfBuffer));
    }
}
