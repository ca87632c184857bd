use crate::error::{Error, Result};


pub const MAX_VARINT_LEN: usize = 10;


/// Little-endian base-128: 7 payload bits per byte, high bit set while more
/// bytes follow.
pub fn encode_varint(value: u64) -> ([u8; MAX_VARINT_LEN], usize) {
    let mut bytes = [0; MAX_VARINT_LEN];
    let mut value = value;
    let mut length = 0;
    loop {
        if value & !0x7f == 0 {
            bytes[length] = value as u8;
            length += 1;
            break;
        }
        else {
            bytes[length] = (value & 0x7f) as u8 | 0x80;
            length += 1;
            value >>= 7;
        }
    }
    (bytes, length)
}

pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 { 1 } else { (bits + 6) / 7 }
}

/// Pulls bytes from `next` until a byte without the continuation bit.
/// Fails if the value needs more than `bits` bits.
pub fn decode_varint<F: FnMut() -> Result<u8>>(bits: u32, mut next: F) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = next()?;
        let payload = (byte & 0x7f) as u64;

        if shift >= 64 || (shift > 0 && payload >> (64 - shift) != 0) {
            return Err(Error::VarintOverflow(bits));
        }
        result |= payload << shift;

        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    if bits < 64 && result >> bits != 0 {
        return Err(Error::VarintOverflow(bits));
    }
    Ok(result)
}


pub fn zigzag_encode_i16(n: i16) -> u16 { ((n << 1) ^ (n >> 15)) as u16 }
pub fn zigzag_encode_i32(n: i32) -> u32 { ((n << 1) ^ (n >> 31)) as u32 }
pub fn zigzag_encode_i64(n: i64) -> u64 { ((n << 1) ^ (n >> 63)) as u64 }

pub fn zigzag_decode_i16(n: u16) -> i16 { ((n >> 1) as i16) ^ -((n & 1) as i16) }
pub fn zigzag_decode_i32(n: u32) -> i32 { ((n >> 1) as i32) ^ -((n & 1) as i32) }
pub fn zigzag_decode_i64(n: u64) -> i64 { ((n >> 1) as i64) ^ -((n & 1) as i64) }
