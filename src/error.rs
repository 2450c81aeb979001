use std::fmt;
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// A schema declaration was malformed: not one of the three legal JSON
    /// shapes, an unknown or duplicate type name, a bad field or symbol list,
    /// or a union violating the nesting/ambiguity rules.
    SchemaParse(String),
    /// A value did not conform to the schema it was being written under, or
    /// no union branch accepted it.
    TypeMismatch(String),
    /// Reader and writer schemas are incompatible: mismatched top-level
    /// types, a fixed size change, an enum symbol with no mapping, a new
    /// field without a default, or a union with no resolvable branch.
    Resolution(String),
    /// The byte stream itself is corrupt: a variable-length integer ran past
    /// 64 bits, a count or length was negative, a sync marker did not match,
    /// or the data ended mid-datum.
    Integrity(String),
    /// A container file header failed to parse: bad magic, or missing or
    /// unusable metadata.
    BadContainer(String),
    /// A container file named a codec that is not in the registry.
    UnknownCodec(String),
    /// A registered codec failed while compressing or decompressing a block.
    Codec(String),
    /// I/O failure on the underlying stream.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::SchemaParse(ref msg) => write!(f, "Schema parse failure: {}", msg),
            Error::TypeMismatch(ref msg) => write!(f, "Datum does not match schema: {}", msg),
            Error::Resolution(ref msg) => {
                write!(f, "Reader and writer schemas do not resolve: {}", msg)
            }
            Error::Integrity(ref msg) => write!(f, "Corrupt data: {}", msg),
            Error::BadContainer(ref msg) => write!(f, "Invalid container file: {}", msg),
            Error::UnknownCodec(ref name) => write!(f, "Codec {:?} is not registered", name),
            Error::Codec(ref msg) => write!(f, "Codec failure: {}", msg),
            Error::Io(ref err) => write!(f, "I/O failure: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Running out of bytes mid-decode is data corruption, not a stream
        // fault. Keep the two distinguishable for callers.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Integrity("unexpected end of data".into())
        } else {
            Error::Io(err)
        }
    }
}
