use clap::error::ErrorKind;
use std::{error::Error, fmt};

#[derive(Debug, Clone)]
pub enum CrxCliError {
    UnsupportedFileType,
    UnsupportedPackSource(String),
    NotFound(String),
}

impl Error for CrxCliError {}

impl fmt::Display for CrxCliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrxCliError::UnsupportedFileType => {
                write!(f, "Unsupported file type. Only CRX files are supported")
            }
            CrxCliError::UnsupportedPackSource(path) => write!(
                f,
                "{} is neither a directory nor a zip file",
                path
            ),
            CrxCliError::NotFound(path) => write!(f, "{} not found", path),
        }
    }
}

impl From<CrxCliError> for ErrorKind {
    fn from(error: CrxCliError) -> Self {
        match error {
            CrxCliError::UnsupportedFileType | CrxCliError::UnsupportedPackSource(_) => {
                ErrorKind::InvalidValue
            }
            CrxCliError::NotFound(_) => ErrorKind::Io,
        }
    }
}
