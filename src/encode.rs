//! Low-level binary encoding of Avro primitives.
//!
//! Every function appends to a byte vector and cannot fail: conformance of a
//! datum to its schema is the [`DatumWriter`]'s job, and by the time these run
//! the value is known to fit. Integers use zig-zag variable-length encoding,
//! floats are IEEE 754 little-endian, and byte strings carry a length prefix.
//!
//! [`DatumWriter`]: crate::DatumWriter

/// Appends a boolean as a single byte, 1 for true and 0 for false.
pub fn write_bool(buf: &mut Vec<u8>, v: bool) {
    buf.push(v as u8);
}

/// Appends a zig-zag variable-length integer.
///
/// The value is first mapped to an unsigned integer so that small magnitudes
/// of either sign stay small: 0 becomes 0, -1 becomes 1, 1 becomes 2, and so
/// on. The result is then written seven bits at a time, least significant
/// first, with the high bit of each byte marking continuation. The longest
/// possible output is 10 bytes.
pub fn write_long(buf: &mut Vec<u8>, v: i64) {
    let mut n = ((v << 1) ^ (v >> 63)) as u64;
    loop {
        let byte = (n & 0x7F) as u8;
        n >>= 7;
        if n == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Appends a 32-bit float as 4 little-endian IEEE 754 bytes.
pub fn write_float(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_bits().to_le_bytes());
}

/// Appends a 64-bit float as 8 little-endian IEEE 754 bytes.
pub fn write_double(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_bits().to_le_bytes());
}

/// Appends a byte string: a long length prefix, then the bytes themselves.
pub fn write_bytes(buf: &mut Vec<u8>, v: &[u8]) {
    write_long(buf, v.len() as i64);
    buf.extend_from_slice(v);
}

/// Appends a string: a long length prefix, then the UTF-8 bytes.
pub fn write_str(buf: &mut Vec<u8>, v: &str) {
    write_bytes(buf, v.as_bytes());
}
