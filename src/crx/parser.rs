use std::io::{Cursor, Read};

use tracing::{debug, trace};

use super::{
    constants::CRX_MAGIC_VALUE,
    errors::{CrxError, CrxResult},
    reader::CrxReader,
    types::{CrxExtension, CrxMetadata, CrxVersion},
};

/// Reads the 4-byte magic number and checks it is "Cr24".
pub fn read_magic_number<R: Read + ?Sized>(input: &mut R) -> CrxResult<String> {
    let magic = CrxReader::new(input).read_array::<4>()?;

    if magic != CRX_MAGIC_VALUE {
        return Err(CrxError::BadMagicNumber { found: magic });
    }

    Ok(String::from_utf8_lossy(&magic).into_owned())
}

pub fn read_crx_version<R: Read + ?Sized>(input: &mut R) -> CrxResult<CrxVersion> {
    let identifier = CrxReader::new(input).read_u32_le()?;

    CrxVersion::from_identifier(identifier).ok_or(CrxError::UnsupportedVersion(identifier))
}

/// Parses a CRX header from the start of `input`.
///
/// Reading stops at the end of the header: the next byte available from
/// `input` is the first byte of the zip payload.
pub fn parse_metadata<R: Read>(input: &mut R) -> CrxResult<CrxMetadata> {
    let magic_number = read_magic_number(input)?;
    let version = read_crx_version(input)?;
    trace!(%version, "dispatching to interpreter");

    let metadata = version
        .interpreter()
        .parse_metadata_after_version(magic_number, input)?;
    debug!(id = metadata.id(), %version, "parsed CRX header");

    Ok(metadata)
}

/// Parses an in-memory CRX file into its metadata and zip payload.
pub fn parse_crx(data: &[u8]) -> CrxResult<CrxExtension> {
    let mut cursor = Cursor::new(data);
    let metadata = parse_metadata(&mut cursor)?;

    let mut zip = Vec::new();
    cursor.read_to_end(&mut zip)?;

    Ok(CrxExtension { metadata, zip })
}
