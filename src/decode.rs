//! Low-level binary decoding of Avro primitives.
//!
//! Mirrors [`encode`](crate::encode), reading from any [`Read`] impl so the
//! same routines serve in-memory slices and container files. Truncated input
//! surfaces as [`Error::Integrity`], not an I/O error: the bytes were framed
//! by a length that promised more data than is there.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Reads a boolean byte. Anything other than 0 or 1 is corrupt data.
pub fn read_bool<R: Read>(r: &mut R) -> Result<bool> {
    match r.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        byte => Err(Error::Integrity(format!(
            "boolean byte must be 0 or 1, got 0x{:02x}",
            byte
        ))),
    }
}

/// Reads a zig-zag variable-length integer.
///
/// At most 10 bytes are consumed. A continuation past the 10th byte, or a
/// 10th byte carrying more than the single remaining bit, means the encoding
/// overruns 64 bits and the stream is rejected.
pub fn read_long<R: Read>(r: &mut R) -> Result<i64> {
    let mut n: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = r.read_u8()?;
        if shift == 63 && (byte & 0x7E) != 0 {
            return Err(Error::Integrity(
                "variable-length integer overruns 64 bits".into(),
            ));
        }
        n |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 63 {
            return Err(Error::Integrity(
                "variable-length integer overruns 64 bits".into(),
            ));
        }
    }
    Ok(((n >> 1) as i64) ^ -((n & 1) as i64))
}

/// Reads a 32-bit float from 4 little-endian IEEE 754 bytes.
pub fn read_float<R: Read>(r: &mut R) -> Result<f32> {
    Ok(r.read_f32::<LittleEndian>()?)
}

/// Reads a 64-bit float from 8 little-endian IEEE 754 bytes.
pub fn read_double<R: Read>(r: &mut R) -> Result<f64> {
    Ok(r.read_f64::<LittleEndian>()?)
}

/// Reads exactly `len` raw bytes, as for a fixed type or a sync marker.
pub fn read_fixed<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    // Take-limited read instead of read_exact into a pre-sized buffer, so a
    // lying length prefix cannot demand a huge allocation up front.
    let mut v = Vec::new();
    let got = r.by_ref().take(len as u64).read_to_end(&mut v)?;
    if got != len {
        return Err(Error::Integrity("unexpected end of data".into()));
    }
    Ok(v)
}

/// Reads a length-prefixed byte string.
pub fn read_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = read_long(r)?;
    if len < 0 {
        return Err(Error::Integrity(format!(
            "byte string has negative length {}",
            len
        )));
    }
    read_fixed(r, len as usize)
}

/// Reads a length-prefixed UTF-8 string.
pub fn read_str<R: Read>(r: &mut R) -> Result<String> {
    String::from_utf8(read_bytes(r)?)
        .map_err(|_| Error::Integrity("string is not valid UTF-8".into()))
}

/// Discards exactly `len` bytes.
pub fn skip<R: Read>(r: &mut R, len: u64) -> Result<()> {
    let skipped = std::io::copy(&mut r.by_ref().take(len), &mut std::io::sink())?;
    if skipped != len {
        return Err(Error::Integrity("unexpected end of data".into()));
    }
    Ok(())
}

/// Discards a length-prefixed byte string without decoding it.
pub fn skip_bytes<R: Read>(r: &mut R) -> Result<()> {
    let len = read_long(r)?;
    if len < 0 {
        return Err(Error::Integrity(format!(
            "byte string has negative length {}",
            len
        )));
    }
    skip(r, len as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;

    #[test]
    fn roundtrip_long() {
        // Run through all the boundary cases
        let mut test_cases: Vec<i64> = vec![0, 1, -1, 2, -2, 63, -63, 64, -64, 65, -65];
        for i in -2..3 {
            test_cases.push(i32::MIN as i64 + i);
            test_cases.push(i32::MAX as i64 + i);
        }
        for i in 0..3 {
            test_cases.push(i64::MIN + i);
            test_cases.push(i64::MAX - i);
        }

        for case in test_cases {
            let mut enc = Vec::new();
            encode::write_long(&mut enc, case);
            let dec = read_long(&mut &enc[..]).expect("Should have decoded the long");
            assert_eq!(dec, case);
        }
    }

    #[test]
    fn roundtrip_floats() {
        for case in [0.0f32, -0.0, 1.5, f32::MIN, f32::MAX, f32::INFINITY] {
            let mut enc = Vec::new();
            encode::write_float(&mut enc, case);
            let dec = read_float(&mut &enc[..]).expect("Should have decoded the float");
            assert_eq!(dec, case);
        }
        for case in [0.0f64, -0.0, 1.5, f64::MIN, f64::MAX, f64::NEG_INFINITY] {
            let mut enc = Vec::new();
            encode::write_double(&mut enc, case);
            let dec = read_double(&mut &enc[..]).expect("Should have decoded the double");
            assert_eq!(dec, case);
        }
    }

    #[test]
    fn roundtrip_bytes() {
        let mut enc = Vec::new();
        encode::write_bytes(&mut enc, b"raw \xff\x00 data");
        encode::write_str(&mut enc, "text \u{1F980} data");
        let mut r = &enc[..];
        assert_eq!(
            read_bytes(&mut r).expect("Should have decoded the bytes"),
            b"raw \xff\x00 data"
        );
        assert_eq!(
            read_str(&mut r).expect("Should have decoded the string"),
            "text \u{1F980} data"
        );
        assert!(r.is_empty(), "Decoding should consume the whole buffer");
    }

    #[test]
    fn varint_too_long() {
        let test_cases: Vec<Vec<u8>> = vec![
            // 11 continuation bytes
            vec![0xff; 11],
            // 10th byte has value bits beyond bit 63
            vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x02],
            // continuation on the 10th byte
            vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x81, 0x00],
        ];
        for (index, case) in test_cases.iter().enumerate() {
            let result = read_long(&mut &case[..]);
            assert!(
                matches!(result, Err(Error::Integrity(_))),
                "Test #{} should have failed as corrupt",
                index
            );
        }
    }

    #[test]
    fn not_enough_bytes() {
        // A continuation bit with nothing after it
        assert!(read_long(&mut &[0x80u8][..]).is_err());
        // Float cut short
        assert!(read_float(&mut &[0x00u8, 0x00, 0x80][..]).is_err());
        // Length prefix promises 4 bytes, only 2 present
        assert!(read_bytes(&mut &[0x08u8, 0xaa, 0xbb][..]).is_err());
        // Same for a skip
        assert!(skip_bytes(&mut &[0x08u8, 0xaa, 0xbb][..]).is_err());
    }

    #[test]
    fn negative_length() {
        // Length -1 as a zig-zag varint
        let result = read_bytes(&mut &[0x01u8][..]);
        assert!(matches!(result, Err(Error::Integrity(_))));
    }

    #[test]
    fn bad_bool_byte() {
        assert!(read_bool(&mut &[0x00u8][..]).unwrap() == false);
        assert!(read_bool(&mut &[0x01u8][..]).unwrap() == true);
        assert!(matches!(
            read_bool(&mut &[0x02u8][..]),
            Err(Error::Integrity(_))
        ));
    }

    #[test]
    fn bad_utf8() {
        // Two bytes of invalid UTF-8 under a valid length prefix
        let result = read_str(&mut &[0x04u8, 0xc3, 0x28][..]);
        assert!(matches!(result, Err(Error::Integrity(_))));
    }
}
