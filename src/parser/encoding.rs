//! Binary encoding primitives for function body values.
//!
//! Provides LEB128 integer encoding and IEEE 754 float encoding as used by
//! the binary format. All functions append to a caller-provided buffer.

use byteorder::{ByteOrder, LittleEndian};

// ---------------------------------------------------------------------------
// Unsigned LEB128
// ---------------------------------------------------------------------------

fn write_vu(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the unsigned LEB128 encoding of a u32 value to `buf`.
pub fn write_vu32(buf: &mut Vec<u8>, v: u32) {
    write_vu(buf, v as u64);
}

/// Appends the unsigned LEB128 encoding of a u64 value to `buf`.
pub fn write_vu64(buf: &mut Vec<u8>, v: u64) {
    write_vu(buf, v);
}

/// Appends a length-prefixed vector of unsigned LEB128 u32 values to `buf`.
pub fn write_vu32_vec(buf: &mut Vec<u8>, values: &[u32]) {
    write_vu32(buf, values.len() as u32);
    for &v in values {
        write_vu32(buf, v);
    }
}

// ---------------------------------------------------------------------------
// Signed LEB128
// ---------------------------------------------------------------------------

fn write_vs(buf: &mut Vec<u8>, mut value: i64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if (value == 0 && (byte & 0x40) == 0) || (value == -1 && (byte & 0x40) != 0) {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the signed LEB128 encoding of an i32 value to `buf`.
pub fn write_vs32(buf: &mut Vec<u8>, v: i32) {
    write_vs(buf, v as i64);
}

/// Appends the signed 33-bit LEB128 encoding used by block types.
pub fn write_vs33(buf: &mut Vec<u8>, v: i64) {
    write_vs(buf, v);
}

/// Appends the signed LEB128 encoding of an i64 value to `buf`.
pub fn write_vs64(buf: &mut Vec<u8>, v: i64) {
    write_vs(buf, v);
}

// ---------------------------------------------------------------------------
// IEEE 754 floats (little-endian)
// ---------------------------------------------------------------------------

pub fn write_f32(buf: &mut Vec<u8>, v: f32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_f32(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

pub fn write_f64(buf: &mut Vec<u8>, v: f64) {
    let mut bytes = [0u8; 8];
    LittleEndian::write_f64(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::reader::Reader;
    use rand::Rng;

    fn assert_eq_with_diag<T: std::fmt::Debug + std::cmp::PartialEq>(actual: T, expected: T) {
        assert!(
            actual == expected,
            "Assertion failed. Actual: {actual:?}, Expected: {expected:?}",
        );
    }

    fn encode_vu32(v: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vu32(&mut buf, v);
        buf
    }

    fn encode_vu64(v: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vu64(&mut buf, v);
        buf
    }

    fn encode_vs33(v: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vs33(&mut buf, v);
        buf
    }

    fn encode_vs32(v: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vs32(&mut buf, v);
        buf
    }

    fn encode_vs64(v: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vs64(&mut buf, v);
        buf
    }

    #[test]
    fn test_write_vu32() {
        assert_eq_with_diag(encode_vu32(0), vec![0]);
        assert_eq_with_diag(encode_vu32(624485), vec![0b11100101, 0b10001110, 0b00100110]);
        assert_eq_with_diag(encode_vu32(127), vec![0x7f]);
        assert_eq_with_diag(encode_vu32(16256), vec![0x80, 0x7f]);
        assert_eq_with_diag(encode_vu32(0xffffffff), vec![0xff, 0xff, 0xff, 0xff, 0xf]);
    }

    #[test]
    fn test_write_vs32() {
        assert_eq_with_diag(encode_vs32(0), vec![0]);
        assert_eq_with_diag(encode_vs32(-1), vec![0x7f]);
        assert_eq_with_diag(encode_vs32(-128), vec![0x80, 0x7f]);
        assert_eq_with_diag(encode_vs32(-624485), vec![0b10011011, 0b11110001, 0b01011001]);
        assert_eq_with_diag(encode_vs32(i32::MIN), vec![128, 128, 128, 128, 120]);
    }

    #[test]
    fn test_write_vs33_block_types() {
        let mut buf = Vec::new();
        write_vs33(&mut buf, -64);
        write_vs33(&mut buf, -1);
        write_vs33(&mut buf, 200);
        assert_eq!(buf, vec![0x40, 0x7f, 0xc8, 0x01]);
    }

    #[test]
    fn test_write_floats() {
        let mut buf = Vec::new();
        write_f32(&mut buf, 6.283_185_5);
        write_f64(&mut buf, std::f64::consts::TAU);
        assert_eq!(buf, vec![219, 15, 201, 64, 24, 45, 68, 84, 251, 33, 25, 64]);
    }

    #[test]
    fn test_write_vu32_vec() {
        let mut buf = Vec::new();
        write_vu32_vec(&mut buf, &[0, 129, 2]);
        assert_eq!(buf, vec![3, 0, 0x81, 0x01, 2]);
    }

    #[test]
    fn test_rt_vu32() {
        let mut test_values = vec![0, 1, u32::MAX, 128, 129, 624485];
        for i in 0..32 {
            let value = 1u32 << i;
            test_values.push(value);
            test_values.push(value - 1);
            test_values.push(value.wrapping_add(1));
        }
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            test_values.push(rng.gen::<u32>());
        }

        for &expected in &test_values {
            let bytes = encode_vu32(expected);
            let len = bytes.len();
            let mut reader = Reader::new(bytes);
            assert_eq_with_diag(reader.read_vu32().expect("Failed to read vu32"), expected);
            assert_eq!(reader.pos(), len);
        }
    }

    #[test]
    fn test_rt_vu64() {
        let mut test_values = vec![0, 1, u64::MAX, u32::MAX as u64, 128, 129, 624485];
        for i in 0..64 {
            let value = 1u64 << i;
            test_values.push(value);
            test_values.push(value - 1);
            test_values.push(value.wrapping_add(1));
        }
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            test_values.push(rng.gen::<u64>());
        }

        for &expected in &test_values {
            let bytes = encode_vu64(expected);
            let len = bytes.len();
            let mut reader = Reader::new(bytes);
            assert_eq_with_diag(reader.read_vu64().expect("Failed to read vu64"), expected);
            assert_eq!(reader.pos(), len);
        }
    }

    #[test]
    fn test_rt_vs33() {
        // value type codes, the empty block type and the full type index range
        let mut test_values = vec![-0x40, -0x01, -0x02, -0x03, -0x04, 0, 1, 63, 64, u32::MAX as i64, -(1i64 << 32)];
        for i in 0..32 {
            let value = 1i64 << i;
            test_values.push(value);
            test_values.push(-value);
            test_values.push(value - 1);
        }
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            test_values.push(rng.gen_range(-(1i64 << 32)..1i64 << 32));
        }

        for &expected in &test_values {
            let bytes = encode_vs33(expected);
            let len = bytes.len();
            assert!(len <= 5, "{expected} took {len} bytes");
            let mut reader = Reader::new(bytes);
            assert_eq_with_diag(reader.read_vs33().expect("Failed to read vs33"), expected);
            assert_eq!(reader.pos(), len);
        }
    }

    #[test]
    fn test_rt_vs32() {
        let mut test_values = vec![0, 1, -1, i32::MAX, i32::MIN, 63, 64, -64, -65, 624485, -624485];
        for i in 0..31 {
            let value = 1i32 << i;
            test_values.push(value);
            test_values.push(-value);
            test_values.push(value - 1);
            test_values.push(-value - 1);
        }
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            test_values.push(rng.gen::<i32>());
        }

        for &expected in &test_values {
            let bytes = encode_vs32(expected);
            let len = bytes.len();
            let mut reader = Reader::new(bytes);
            assert_eq_with_diag(reader.read_vs32().expect("Failed to read vs32"), expected);
            assert_eq!(reader.pos(), len);
        }
    }

    #[test]
    fn test_rt_vs64() {
        let mut test_values = vec![0, 1, -1, i64::MAX, i64::MIN, 624485, -624485];
        for i in 0..63 {
            let value = 1i64 << i;
            test_values.push(value);
            test_values.push(-value);
            test_values.push(value - 1);
            test_values.push(-value - 1);
        }
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            test_values.push(rng.gen::<i64>());
        }

        for &expected in &test_values {
            let bytes = encode_vs64(expected);
            let len = bytes.len();
            let mut reader = Reader::new(bytes);
            assert_eq_with_diag(reader.read_vs64().expect("Failed to read vs64"), expected);
            assert_eq!(reader.pos(), len);
        }
    }
}
