use std::io;

use thiserror::Error;

use super::types::ProofAlgorithm;

pub type CrxResult<T> = Result<T, CrxError>;

#[derive(Debug, Error)]
pub enum CrxError {
    #[error("invalid magic number: expected \"Cr24\", found {found:02x?}")]
    BadMagicNumber { found: [u8; 4] },

    #[error("unsupported CRX version: {0}")]
    UnsupportedVersion(u32),

    #[error("{field} length is insane: {length}")]
    InsaneLength { field: &'static str, length: u32 },

    #[error("header does not contain {0} asymmetric key proof")]
    MissingProof(ProofAlgorithm),

    #[error("malformed CRX3 header message: {0}")]
    MalformedHeader(#[from] prost::DecodeError),

    #[error("malformed digest: {0}")]
    MalformedDigest(String),

    #[error("unexpected end of stream")]
    EndOfStream(#[source] io::Error),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("key error: {0}")]
    Key(String),

    #[error(transparent)]
    Io(io::Error),
}

/// Coarse classification of a [`CrxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrxErrorKind {
    /// The bytes are not a well-formed CRX header.
    Format,
    /// The stream ended before a declared field was complete.
    EndOfStream,
    /// The caller passed something the packer refuses to write.
    Argument,
    Key,
    Io,
}

impl CrxError {
    pub fn kind(&self) -> CrxErrorKind {
        match self {
            CrxError::BadMagicNumber { .. }
            | CrxError::UnsupportedVersion(_)
            | CrxError::InsaneLength { .. }
            | CrxError::MissingProof(_)
            | CrxError::MalformedHeader(_)
            | CrxError::MalformedDigest(_) => CrxErrorKind::Format,
            CrxError::EndOfStream(_) => CrxErrorKind::EndOfStream,
            CrxError::Argument(_) => CrxErrorKind::Argument,
            CrxError::Key(_) => CrxErrorKind::Key,
            CrxError::Io(_) => CrxErrorKind::Io,
        }
    }

    pub fn is_format_error(&self) -> bool {
        self.kind() == CrxErrorKind::Format
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.kind() == CrxErrorKind::EndOfStream
    }
}

impl From<io::Error> for CrxError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => CrxError::EndOfStream(err),
            _ => CrxError::Io(err),
        }
    }
}

impl From<zip::result::ZipError> for CrxError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(err) => CrxError::Io(err),
            other => CrxError::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}
