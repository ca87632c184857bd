use log::debug;
use serde_json::{Number, Value};

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::header::ListHeader;
use crate::proto::Protocol;
use crate::schema::Message;
use crate::wire_type::WireType;


pub fn expect_wire_type(ty: &TypeDescriptor, expected: WireType) -> Result<()> {
    let found = ty.wire_type();
    if found == WireType::Null {
        return Err(Error::UnsupportedType("cannot read a value of unresolved type".into()));
    }
    if found != expected {
        return Err(Error::mismatch(expected, found));
    }
    Ok(())
}

fn expect_compatible(declared: &TypeDescriptor, found: WireType) -> Result<()> {
    if !declared.wire_type().is_compatible_with(found) {
        return Err(Error::mismatch(declared, found));
    }
    Ok(())
}


/// Runs `f` one nesting level deeper, failing once `Limits::max_depth` is
/// exceeded.
fn nested<R, F>(proto: &mut dyn Protocol, f: F) -> Result<R>
where F: FnOnce(&mut dyn Protocol) -> Result<R>
{
    proto.enter()?;
    let result = f(&mut *proto);
    proto.leave();
    result
}


/// Reads fields until the stop header. Fields the target schema knows are
/// assigned; unknown IDs are skipped using only their wire tag.
pub fn read_struct<M: Message>(ty: &TypeDescriptor, proto: &mut dyn Protocol) -> Result<M> {
    expect_wire_type(ty, WireType::Struct)?;
    let schema = M::message_schema()?;

    nested(proto, |proto| {
        proto.read_struct_begin()?;
        let mut result = M::instantiate()?;

        loop {
            let header = proto.read_field_begin()?;
            if header.is_stop() {
                break;
            }

            match schema.field(header.id) {
                Some(field) => {
                    expect_compatible(field.descriptor(), header.wire_type)?;
                    result.read_field(field, proto)?;
                },
                None => {
                    debug!("skipping unknown field {} ({:?}) in {}", header.id, header.wire_type, schema.name());
                    skip(proto, header.wire_type)?;
                },
            }
        }

        proto.read_struct_end()?;
        Ok(result)
    })
}

/// Reads a List or Set header and calls `f` once per element. Either wire
/// shape is accepted for either declared shape.
pub fn read_sequence<F>(ty: &TypeDescriptor, proto: &mut dyn Protocol, mut f: F) -> Result<()>
where F: FnMut(&TypeDescriptor, &mut dyn Protocol) -> Result<()>
{
    let (header, element): (ListHeader, &TypeDescriptor) = match ty {
        TypeDescriptor::List(element) => (proto.read_list_begin()?, &**element),
        TypeDescriptor::Set(element)  => (proto.read_set_begin()?, &**element),
        other => return Err(Error::mismatch(other, "sequence")),
    };

    let count = proto.limits().check_container_len(header.count)?;
    if count > 0 {
        expect_compatible(element, header.element)?;
    }
    nested(proto, |proto| {
        for _ in 0..count {
            f(element, proto)?;
        }
        Ok(())
    })
}

/// Reads a Map header and calls `f` once per entry.
pub fn read_map<F>(ty: &TypeDescriptor, proto: &mut dyn Protocol, mut f: F) -> Result<()>
where F: FnMut(&TypeDescriptor, &TypeDescriptor, &mut dyn Protocol) -> Result<()>
{
    let (key, value) = match ty {
        TypeDescriptor::Map(key, value) => (key, value),
        other => return Err(Error::mismatch(other, "map")),
    };

    let header = proto.read_map_begin()?;
    let count = proto.limits().check_container_len(header.count)?;
    if count > 0 {
        expect_compatible(key, header.key)?;
        expect_compatible(value, header.value)?;
    }
    nested(proto, |proto| {
        for _ in 0..count {
            f(key, value, proto)?;
        }
        Ok(())
    })
}


/// Consumes one value of wire type `ty` without materializing it.
pub fn skip(proto: &mut dyn Protocol, ty: WireType) -> Result<()> {
    use WireType::*;
    match ty {
        Null   => return Err(Error::UnsupportedType("cannot skip a null-tagged value".into())),
        Bool   => { proto.read_bool()?; },
        Byte   => { proto.read_byte()?; },
        I16    => { proto.read_i16()?; },
        I32    => { proto.read_i32()?; },
        I64    => { proto.read_i64()?; },
        Float  => { proto.read_float()?; },
        Double => { proto.read_double()?; },
        Binary => { proto.read_binary()?; },
        String => { proto.read_string()?; },
        Struct => nested(proto, |proto| {
            proto.read_struct_begin()?;
            loop {
                let header = proto.read_field_begin()?;
                if header.is_stop() {
                    break;
                }
                skip(proto, header.wire_type)?;
            }
            proto.read_struct_end()
        })?,
        Map => nested(proto, |proto| {
            let header = proto.read_map_begin()?;
            let count = proto.limits().check_container_len(header.count)?;
            for _ in 0..count {
                skip(proto, header.key)?;
                skip(proto, header.value)?;
            }
            Ok(())
        })?,
        List | Set => nested(proto, |proto| {
            let header = if ty == Set { proto.read_set_begin()? } else { proto.read_list_begin()? };
            let count = proto.limits().check_container_len(header.count)?;
            for _ in 0..count {
                skip(proto, header.element)?;
            }
            Ok(())
        })?,
    }
    Ok(())
}


/// Schema-less decode of one value into JSON. Struct fields are keyed by
/// their decimal ID, maps become `[key, value]` pairs, binary becomes an
/// array of byte values, and non-finite floats become null.
pub fn read_dynamic(proto: &mut dyn Protocol, ty: WireType) -> Result<Value> {
    use WireType::*;
    let result = match ty {
        Null   => return Err(Error::UnsupportedType("cannot read a null-tagged value".into())),
        Bool   => Value::Bool(proto.read_bool()?),
        Byte   => Value::from(proto.read_byte()?),
        I16    => Value::from(proto.read_i16()?),
        I32    => Value::from(proto.read_i32()?),
        I64    => Value::from(proto.read_i64()?),
        Float  => float_value(proto.read_float()? as f64),
        Double => float_value(proto.read_double()?),
        Binary => Value::Array(proto.read_binary()?.into_iter().map(Value::from).collect()),
        String => Value::String(proto.read_string()?),
        Struct => nested(proto, |proto| {
            proto.read_struct_begin()?;
            let mut fields = serde_json::Map::new();
            loop {
                let header = proto.read_field_begin()?;
                if header.is_stop() {
                    break;
                }
                let value = read_dynamic(proto, header.wire_type)?;
                fields.insert(header.id.to_string(), value);
            }
            proto.read_struct_end()?;
            Ok(Value::Object(fields))
        })?,
        Map => nested(proto, |proto| {
            let header = proto.read_map_begin()?;
            let count = proto.limits().check_container_len(header.count)?;
            let mut entries = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                let key   = read_dynamic(proto, header.key)?;
                let value = read_dynamic(proto, header.value)?;
                entries.push(Value::Array(vec![key, value]));
            }
            Ok(Value::Array(entries))
        })?,
        List | Set => nested(proto, |proto| {
            let header = if ty == Set { proto.read_set_begin()? } else { proto.read_list_begin()? };
            let count = proto.limits().check_container_len(header.count)?;
            let mut values = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                values.push(read_dynamic(proto, header.element)?);
            }
            Ok(Value::Array(values))
        })?,
    };
    Ok(result)
}

fn float_value(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryProtocol;
    use crate::config::Limits;
    use crate::descriptor::Wire;
    use crate::header::{FieldHeader, MapHeader};
    use crate::reader::Reader;
    use serde_json::json;

    fn reading(data: &[u8]) -> BinaryProtocol<Reader<'_, u8>> {
        BinaryProtocol::new(Reader::new(data))
    }

    fn nested_struct() -> Vec<u8> {
        let mut proto = BinaryProtocol::new(vec![]);
        proto.write_field_begin(FieldHeader::new(1, WireType::I32)).unwrap();
        proto.write_i32(-3).unwrap();
        proto.write_field_begin(FieldHeader::new(2, WireType::Struct)).unwrap();
        proto.write_field_begin(FieldHeader::new(7, WireType::String)).unwrap();
        proto.write_string("in").unwrap();
        proto.write_field_stop().unwrap();
        proto.write_field_begin(FieldHeader::new(3, WireType::Map)).unwrap();
        proto.write_map_begin(MapHeader::new(1, WireType::Byte, WireType::Double).unwrap()).unwrap();
        proto.write_byte(4).unwrap();
        proto.write_double(0.5).unwrap();
        proto.write_field_stop().unwrap();
        proto.into_inner()
    }

    #[test]
    fn skip_consumes_exactly_one_struct() {
        let mut data = nested_struct();
        data.push(0xaa);
        let mut proto = reading(&data);
        skip(&mut proto, WireType::Struct).unwrap();
        assert_eq!(proto.buffer().remaining(), 1);
    }

    #[test]
    fn skip_null_fails() {
        let mut proto = reading(&[]);
        assert!(matches!(skip(&mut proto, WireType::Null), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn dynamic_read_keys_fields_by_id() {
        let data = nested_struct();
        let value = read_dynamic(&mut reading(&data), WireType::Struct).unwrap();
        assert_eq!(value, json!({ "1": -3, "2": { "7": "in" }, "3": [[4, 0.5]] }));
    }

    #[test]
    fn sequences_check_element_tags() {
        let mut proto = BinaryProtocol::new(vec![]);
        proto.write_list_begin(ListHeader::new(1, WireType::String).unwrap()).unwrap();
        proto.write_string("x").unwrap();
        let data = proto.into_inner();

        let result = <Vec<i32> as Wire>::decode(&<Vec<i32> as Wire>::descriptor(), &mut reading(&data));
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));

        let result = <Vec<String> as Wire>::decode(&<Vec<String> as Wire>::descriptor(), &mut reading(&data));
        assert_eq!(result.unwrap(), vec!["x".to_string()]);
    }

    #[test]
    fn empty_sequences_ignore_element_tag() {
        let data = [WireType::Null as u8];
        let result = <Vec<i32> as Wire>::decode(&<Vec<i32> as Wire>::descriptor(), &mut reading(&data));
        assert_eq!(result.unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn container_limit_applies_before_reading_entries() {
        let data = [(200u32 << 4 | 5) as u8 | 0x80, (200u32 << 4 >> 7) as u8];
        let limits = Limits::default().with_max_container_len(100);
        let mut proto = BinaryProtocol::with_limits(Reader::new(&data[..]), limits);
        let result = <Vec<i32> as Wire>::decode(&<Vec<i32> as Wire>::descriptor(), &mut proto);
        assert!(matches!(result, Err(Error::LimitExceeded { .. })));
    }

    fn deep_structs(levels: usize) -> Vec<u8> {
        let mut data = vec![(1 << 4) | WireType::Struct as u8; levels - 1];
        data.extend(std::iter::repeat(0x01).take(levels));
        data
    }

    #[test]
    fn nesting_depth_is_limited() {
        let data = deep_structs(128);
        assert!(skip(&mut reading(&data), WireType::Struct).is_ok());
        assert!(read_dynamic(&mut reading(&data), WireType::Struct).is_ok());

        let data = deep_structs(129);
        let expected = Error::LimitExceeded { what: "nesting depth", value: 129, limit: 128 };
        assert_eq!(skip(&mut reading(&data), WireType::Struct), Err(expected.clone()));
        assert_eq!(read_dynamic(&mut reading(&data), WireType::Struct), Err(expected));
    }

    #[test]
    fn deep_input_fails_instead_of_overflowing() {
        let data = vec![(1 << 4) | WireType::Struct as u8; 1_000_000];
        assert!(matches!(skip(&mut reading(&data), WireType::Struct), Err(Error::LimitExceeded { .. })));

        let data = vec![(1 << 4) | WireType::List as u8; 1_000_000];
        assert!(matches!(skip(&mut reading(&data), WireType::List), Err(Error::LimitExceeded { .. })));
    }

    #[test]
    fn depth_is_released_between_siblings() {
        let mut proto = BinaryProtocol::new(vec![]);
        proto.write_list_begin(ListHeader::new(200, WireType::List).unwrap()).unwrap();
        for _ in 0..200 {
            proto.write_list_begin(ListHeader::new(0, WireType::I32).unwrap()).unwrap();
        }
        let data = proto.into_inner();

        let limits = Limits::default().with_max_depth(2);
        let mut proto = BinaryProtocol::with_limits(Reader::new(&data[..]), limits);
        let value = <Vec<Vec<i32>> as Wire>::decode(&<Vec<Vec<i32>> as Wire>::descriptor(), &mut proto).unwrap();
        assert_eq!(value.len(), 200);
    }

    #[test]
    fn primitives_check_the_declared_tag() {
        let mut proto = reading(&[1]);
        assert!(matches!(<i32 as Wire>::decode(&TypeDescriptor::I64, &mut proto), Err(Error::TypeMismatch { .. })));
        assert!(matches!(<i32 as Wire>::decode(&TypeDescriptor::Null, &mut proto), Err(Error::UnsupportedType(_))));
    }
}
