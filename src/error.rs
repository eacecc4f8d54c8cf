use std::fmt;

/// Errors surfaced by the blob store.
///
/// Decode errors (`BufferTooShort`, `Overflow`) are pure and local to the
/// identifier codec. `InternalInvariant` should be unreachable with the
/// ring-buffer registry but is kept as a defensive variant.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    PathNotFound,
    PayloadTooLarge,
    BufferTooShort,
    Overflow,
    InternalInvariant(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::PathNotFound => write!(f, "segment not found (evicted)"),
            Error::PayloadTooLarge => write!(f, "payload exceeds max buffer size"),
            Error::BufferTooShort => write!(f, "identifier buffer ended mid-varint"),
            Error::Overflow => write!(f, "identifier varint overflowed 64 bits"),
            Error::InternalInvariant(msg) => write!(f, "internal invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
