use byteorder::{LittleEndian, ReadBytesExt};
use std::io;

use super::limits;
use crate::error::{CompileError, Result};

/// Cursor over the bytes of a single function body.
pub struct Reader {
    bytes: Vec<u8>,
    pos: usize,
}

impl Reader {
    pub fn new(bytes: Vec<u8>) -> Reader {
        Reader { bytes, pos: 0 }
    }
}

impl Reader {
    // Basic operations --------------------------------------------------------
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn has_at_least(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        match self.next() {
            Some(byte) => Ok(byte),
            None => Err(CompileError::malformed("unexpected end of input")),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        if !self.has_at_least(len) {
            return Err(CompileError::malformed("unexpected end of input"));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.bytes[start..self.pos])
    }

    // Read and interpret types ------------------------------------------------

    pub fn read_vu32(&mut self) -> Result<u32> {
        self.read_vu(32).map(|v| v as u32)
    }

    pub fn read_vu64(&mut self) -> Result<u64> {
        self.read_vu(64)
    }

    pub fn read_vs32(&mut self) -> Result<i32> {
        self.read_vs(32).map(|v| v as i32)
    }

    /// Block types are encoded as a signed 33-bit integer so that type indices
    /// can share the space with the negative value type codes.
    pub fn read_vs33(&mut self) -> Result<i64> {
        self.read_vs(33)
    }

    pub fn read_vs64(&mut self) -> Result<i64> {
        self.read_vs(64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let mut rdr = io::Cursor::new(self.read_bytes(4)?);
        rdr.read_f32::<LittleEndian>()
            .map_err(|e| CompileError::malformed(e.to_string()))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut rdr = io::Cursor::new(self.read_bytes(8)?);
        rdr.read_f64::<LittleEndian>()
            .map_err(|e| CompileError::malformed(e.to_string()))
    }

    /// Length-prefixed sequence of unsigned LEB128 u32 values.
    pub fn read_vu32_vec(&mut self) -> Result<Vec<u32>> {
        let count = self.read_vu32()?;
        if count > limits::MAX_BR_TABLE_LABELS {
            return Err(CompileError::malformed(format!(
                "vector length {count} exceeds implementation limit"
            )));
        }
        // every entry takes at least one byte
        if !self.has_at_least(count as usize) {
            return Err(CompileError::malformed(format!(
                "vector length {count} exceeds remaining input"
            )));
        }
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(self.read_vu32()?);
        }
        Ok(values)
    }

    /// Unsigned LEB128 of at most `width` significant bits, 1 to 64.
    pub fn read_vu(&mut self, width: u32) -> Result<u64> {
        check_width(width)?;
        let mut result: u64 = 0;
        let mut shift = 0;

        loop {
            let b = self.read_byte()?;
            let payload = (b & 0x7f) as u64;
            let remaining = width - shift;
            if remaining < 7 && (payload >> remaining) != 0 {
                return Err(CompileError::malformed("integer too large"));
            }
            result |= payload << shift;
            if (b & 0x80) == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift >= width {
                return Err(CompileError::malformed("integer representation too long"));
            }
        }
    }

    /// Signed LEB128 of at most `width` significant bits, sign extended from
    /// the last bit read. `width` is 1 to 64.
    pub fn read_vs(&mut self, width: u32) -> Result<i64> {
        check_width(width)?;
        let mut result: i64 = 0;
        let mut shift = 0;

        loop {
            let b = self.read_byte()?;
            let payload = b & 0x7f;
            let remaining = width - shift;
            if remaining < 7 {
                // the unused high bits must replicate the sign bit
                let high = payload >> (remaining - 1);
                if high != 0 && high != (0x7f >> (remaining - 1)) {
                    return Err(CompileError::malformed("integer too large"));
                }
            }
            result |= (payload as i64) << shift;
            shift += 7;
            if (b & 0x80) == 0 {
                if shift < 64 && (b & 0x40) != 0 {
                    result |= -1i64 << shift;
                }
                return Ok(result);
            }
            if shift >= width {
                return Err(CompileError::malformed("integer representation too long"));
            }
        }
    }
}

fn check_width(width: u32) -> Result<()> {
    if width == 0 || width > 64 {
        return Err(CompileError::malformed(format!("unsupported LEB128 width {width}")));
    }
    Ok(())
}

impl Iterator for Reader {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.bytes.len() {
            let byte = self.bytes[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed<T: std::fmt::Debug>(result: Result<T>) -> bool {
        matches!(result, Err(CompileError::MalformedEncoding(_)))
    }

    #[test]
    fn test_read_byte() {
        let mut reader = Reader::new(vec![0x00, 0x80, 0xff]);
        assert_eq!(reader.read_byte().unwrap(), 0);
        assert_eq!(reader.read_byte().unwrap(), 128);
        assert_eq!(reader.read_byte().unwrap(), 255);
        assert_eq!(reader.pos(), 3);
        assert!(malformed(reader.read_byte()));
    }

    #[test]
    fn test_read_vu32() {
        let read = |v: Vec<u8>| {
            let mut reader = Reader::new(v);
            reader.read_vu32().expect("Failed to read vu32")
        };

        assert_eq!(read(vec![0]), 0);
        assert_eq!(read(vec![1]), 1);
        assert_eq!(read(vec![0b11100101, 0b10001110, 0b00100110]), 624485);
        assert_eq!(read(vec![0x7f]), 127);
        assert_eq!(read(vec![0x80, 0x7f]), 16256);
        assert_eq!(read(vec![0xb4, 0x07]), 0x3b4);
        assert_eq!(read(vec![0x8c, 0x08]), 0x40c);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0xf]), 0xffffffff);
        assert_eq!(read(vec![128, 128, 128, 128, 8]), 0x80000000);
        // padded zero is still within the width
        assert_eq!(read(vec![0x80, 0x80, 0x80, 0x80, 0x00]), 0);
    }

    #[test]
    fn test_read_vu32_stops_at_terminator() {
        let mut reader = Reader::new(vec![0xe5, 0x8e, 0x26, 0x2a]);
        assert_eq!(reader.read_vu32().unwrap(), 624485);
        assert_eq!(reader.pos(), 3);
        assert_eq!(reader.read_byte().unwrap(), 0x2a);
    }

    #[test]
    fn test_read_vu32_malformed() {
        let read = |v: Vec<u8>| Reader::new(v).read_vu32();

        // continuation bit set on the last available byte
        assert!(malformed(read(vec![0x80])));
        assert!(malformed(read(vec![0xff, 0xff])));
        assert!(malformed(read(vec![])));
        // more than 32 significant bits
        assert!(malformed(read(vec![0xff, 0xff, 0xff, 0xff, 0x1f])));
        // continuation past the fifth byte
        assert!(malformed(read(vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x00])));
    }

    #[test]
    fn test_read_vu64() {
        let read = |v: Vec<u8>| {
            let mut reader = Reader::new(v);
            reader.read_vu64().expect("Failed to read vu64")
        };

        assert_eq!(read(vec![0]), 0);
        assert_eq!(read(vec![0b11100101, 0b10001110, 0b00100110]), 624485);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0xf]), 0xffffffff);
        assert_eq!(
            read(vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]),
            u64::MAX
        );
        assert!(malformed(
            Reader::new(vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02]).read_vu64()
        ));
    }

    #[test]
    fn test_read_vs32() {
        let read = |v: Vec<u8>| {
            let mut reader = Reader::new(v);
            reader.read_vs32().expect("Failed to read vs32")
        };

        assert_eq!(read(vec![0]), 0);
        assert_eq!(read(vec![1]), 1);
        assert_eq!(read(vec![0b11100101, 0b10001110, 0b00100110]), 624485);
        assert_eq!(read(vec![0xb4, 0x07]), 0x3b4);
        assert_eq!(read(vec![0x8c, 0x08]), 0x40c);
        assert_eq!(read(vec![0x7f]), -1);
        assert_eq!(read(vec![0x80, 0x7f]), -128);
        assert_eq!(read(vec![0b10011011, 0b11110001, 0b01011001]), -624485);
        // this is different as a 32 than a 64
        assert_eq!(read(vec![128, 128, 128, 128, 120]), 0x80000000u32 as i32);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0x07]), i32::MAX);
    }

    #[test]
    fn test_read_vs32_malformed() {
        let read = |v: Vec<u8>| Reader::new(v).read_vs32();

        assert!(malformed(read(vec![0xff])));
        // unused bits are neither all zero nor all one
        assert!(malformed(read(vec![0xff, 0xff, 0xff, 0xff, 0x4f])));
        assert!(malformed(read(vec![0x80, 0x80, 0x80, 0x80, 0x70])));
        assert!(malformed(read(vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x00])));
    }

    #[test]
    fn test_read_vs33() {
        let read = |v: Vec<u8>| Reader::new(v).read_vs33().expect("Failed to read vs33");

        assert_eq!(read(vec![0x40]), -64);
        assert_eq!(read(vec![0x7f]), -1);
        assert_eq!(read(vec![0x7c]), -4);
        assert_eq!(read(vec![0x05]), 5);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0x0f]), 0xffffffff);
    }

    #[test]
    fn test_read_vs64() {
        let read = |v: Vec<u8>| {
            let mut reader = Reader::new(v);
            reader.read_vs64().expect("Failed to read vs64")
        };

        assert_eq!(read(vec![0]), 0);
        assert_eq!(read(vec![0x7f]), -1);
        assert_eq!(read(vec![0x80, 0x7f]), -128);
        assert_eq!(read(vec![0b10011011, 0b11110001, 0b01011001]), -624485);
        assert_eq!(
            read(vec![128, 128, 128, 128, 128, 128, 128, 252, 255, 0]),
            0x7ff8000000000000
        );
        assert_eq!(
            read(vec![128, 128, 128, 128, 128, 128, 128, 128, 128, 127]),
            i64::MIN
        );
    }

    #[test]
    fn test_read_width_out_of_range() {
        assert!(malformed(Reader::new(vec![0x00]).read_vs(0)));
        assert!(malformed(Reader::new(vec![0x00]).read_vu(0)));
        let mut too_wide = vec![0xff; 9];
        too_wide.push(0x7f);
        assert!(malformed(Reader::new(too_wide.clone()).read_vu(70)));
        assert!(malformed(Reader::new(too_wide).read_vs(65)));
        // nothing is consumed when the width is rejected
        let mut reader = Reader::new(vec![0x01]);
        assert!(malformed(reader.read_vu(65)));
        assert_eq!(reader.pos(), 0);
        assert_eq!(reader.read_vu(1).unwrap(), 1);
    }

    #[test]
    fn test_read_f32() {
        let read = |v: Vec<u8>| {
            let mut reader = Reader::new(v);
            reader.read_f32().expect("Failed to read f32")
        };

        assert!(read(vec![0, 0, 192, 127]).is_nan());
        assert_eq!(read(vec![0, 0, 0, 0]), 0.0);
        assert_eq!(read(vec![219, 15, 201, 64]), 6.283_185_5);
        assert_eq!(read(vec![255, 255, 127, 127]), f32::MAX);
        assert!(malformed(Reader::new(vec![0, 0, 0]).read_f32()));
    }

    #[test]
    fn test_read_f64() {
        let read = |v: Vec<u8>| {
            let mut reader = Reader::new(v);
            reader.read_f64().expect("Failed to read f64")
        };

        assert!(read(vec![0, 0, 0, 0, 0, 0, 248, 127]).is_nan());
        assert_eq!(read(vec![24, 45, 68, 84, 251, 33, 25, 64]), std::f64::consts::TAU);
        assert_eq!(read(vec![255, 255, 255, 255, 255, 255, 239, 127]), f64::MAX);
        assert!(malformed(Reader::new(vec![0; 7]).read_f64()));
    }

    #[test]
    fn test_read_vu32_vec() {
        let mut reader = Reader::new(vec![3, 0, 0x81, 0x01, 2, 9]);
        assert_eq!(reader.read_vu32_vec().unwrap(), vec![0, 129, 2]);
        assert_eq!(reader.read_byte().unwrap(), 9);

        assert!(malformed(Reader::new(vec![4, 0, 1]).read_vu32_vec()));
        assert!(malformed(Reader::new(vec![0xff, 0xff, 0x7f]).read_vu32_vec()));
    }
}
