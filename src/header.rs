use crate::error::{Error, Result};
use crate::wire_type::{WireType, WIRE_TYPE_MASK};


/// Largest field ID or element count that still fits in a packed 32-bit
/// header once the 4-bit tag is shifted in.
pub const MAX_PACKED_VALUE: u32 = u32::MAX >> 4;


fn pack(value: u32, ty: WireType) -> Result<u32> {
    if value > MAX_PACKED_VALUE {
        return Err(Error::SizeOverflow(value as u64));
    }
    Ok((value << 4) | (ty as u8 & WIRE_TYPE_MASK) as u32)
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub id: u32,
    pub wire_type: WireType,
}

impl FieldHeader {
    /// Terminates a struct's field list.
    pub const STOP: FieldHeader = FieldHeader { id: 0, wire_type: WireType::Null };

    pub fn new(id: u32, wire_type: WireType) -> FieldHeader {
        FieldHeader { id, wire_type }
    }

    pub fn is_stop(&self) -> bool {
        self.wire_type == WireType::Null
    }

    pub fn pack(&self) -> Result<u32> {
        pack(self.id, self.wire_type)
    }

    pub fn unpack(value: u32) -> Result<FieldHeader> {
        Ok(FieldHeader { id: value >> 4, wire_type: WireType::from_nibble(value)? })
    }
}


/// Shared by List and Set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub count: u32,
    pub element: WireType,
}

impl ListHeader {
    pub fn new(count: usize, element: WireType) -> Result<ListHeader> {
        let count: u32 = count.try_into().map_err(|_| Error::SizeOverflow(count as u64))?;
        Ok(ListHeader { count, element })
    }

    pub fn pack(&self) -> Result<u32> {
        pack(self.count, self.element)
    }

    pub fn unpack(value: u32) -> Result<ListHeader> {
        Ok(ListHeader { count: value >> 4, element: WireType::from_nibble(value)? })
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub count: u32,
    pub key: WireType,
    pub value: WireType,
}

impl MapHeader {
    pub fn new(count: usize, key: WireType, value: WireType) -> Result<MapHeader> {
        let count: u32 = count.try_into().map_err(|_| Error::SizeOverflow(count as u64))?;
        Ok(MapHeader { count, key, value })
    }

    /// Value tag in the high nibble, key tag in the low nibble.
    pub fn pack_types(&self) -> u8 {
        ((self.value as u8 & WIRE_TYPE_MASK) << 4) | (self.key as u8 & WIRE_TYPE_MASK)
    }

    pub fn unpack(count: u32, types: u8) -> Result<MapHeader> {
        Ok(MapHeader {
            count,
            key:   WireType::from_nibble(types as u32)?,
            value: WireType::from_nibble((types >> 4) as u32)?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_header_packing() {
        let header = FieldHeader::new(1, WireType::I32);
        assert_eq!(header.pack().unwrap(), 0x15);
        assert_eq!(FieldHeader::unpack(0x15).unwrap(), header);

        let header = FieldHeader::new(300, WireType::Struct);
        assert_eq!(FieldHeader::unpack(header.pack().unwrap()).unwrap(), header);
    }

    #[test]
    fn stop_is_null_with_id_zero() {
        assert_eq!(FieldHeader::STOP.pack().unwrap(), WireType::Null as u32);
        assert!(FieldHeader::unpack(1).unwrap().is_stop());
        assert!(!FieldHeader::new(1, WireType::Bool).is_stop());
    }

    #[test]
    fn oversized_ids_are_rejected() {
        assert!(FieldHeader::new(MAX_PACKED_VALUE, WireType::Bool).pack().is_ok());
        assert_eq!(
            FieldHeader::new(MAX_PACKED_VALUE + 1, WireType::Bool).pack(),
            Err(Error::SizeOverflow(MAX_PACKED_VALUE as u64 + 1)));
    }

    #[test]
    fn list_header_packing() {
        let header = ListHeader::new(3, WireType::String).unwrap();
        assert_eq!(header.pack().unwrap(), (3 << 4) | 10);
        assert_eq!(ListHeader::unpack((3 << 4) | 10).unwrap(), header);
    }

    #[test]
    fn map_header_types_byte() {
        let header = MapHeader::new(2, WireType::String, WireType::List).unwrap();
        assert_eq!(header.pack_types(), 0xda);
        assert_eq!(MapHeader::unpack(2, 0xda).unwrap(), header);
    }

    #[test]
    fn unknown_tags_fail() {
        assert!(matches!(ListHeader::unpack(0x10), Err(Error::UnsupportedType(_))));
        assert!(matches!(MapHeader::unpack(0, 0xf5), Err(Error::UnsupportedType(_))));
    }
}
