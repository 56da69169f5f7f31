//! Extension ids.
//!
//! An id is the first 128 bits of the SHA-256 digest of a public key, written
//! as 32 hex digits where `0`-`9` become `a`-`j` and `a`-`f` become `k`-`p`.

use sha2::{Digest, Sha256};

use super::{
    constants::ID_LEN,
    errors::{CrxError, CrxResult},
};

/// Maps a nibble to its id letter: 0 is `a`, 15 is `p`.
fn nibble_to_id_char(nibble: u8) -> char {
    (b'a' + (nibble & 0x0f)) as char
}

/// Renders the first 16 bytes of a digest as an extension id.
fn id_from_digest_bytes(digest: &[u8; ID_LEN / 2]) -> String {
    digest
        .iter()
        .flat_map(|&byte| [nibble_to_id_char(byte >> 4), nibble_to_id_char(byte)])
        .collect()
}

/// Translates a lowercase hex digest into an extension id, using its first
/// [`ID_LEN`] characters.
pub fn translate_digest_to_id(digest: &str) -> CrxResult<String> {
    let prefix = digest.get(..ID_LEN).ok_or_else(|| {
        CrxError::MalformedDigest(format!(
            "expected at least {} hex characters, got {}",
            ID_LEN,
            digest.len()
        ))
    })?;

    prefix
        .chars()
        .map(|c| match c {
            '0'..='9' => Ok(nibble_to_id_char(c as u8 - b'0')),
            'a'..='f' => Ok(nibble_to_id_char(c as u8 - b'a' + 10)),
            other => Err(CrxError::MalformedDigest(format!(
                "not a lowercase hex character: {:?}",
                other
            ))),
        })
        .collect()
}

/// Derives the id of an extension signed with `public_key`.
pub fn extension_id_from_public_key(public_key: &[u8]) -> String {
    let digest = Sha256::digest(public_key);
    let mut prefix = [0u8; ID_LEN / 2];
    prefix.copy_from_slice(&digest[..ID_LEN / 2]);

    id_from_digest_bytes(&prefix)
}

/// Renders a raw 16-byte crx id, as carried in CRX3 signed header data.
pub fn extension_id_from_crx_id(crx_id: &[u8]) -> CrxResult<String> {
    let crx_id: &[u8; ID_LEN / 2] = crx_id.try_into().map_err(|_| {
        CrxError::MalformedDigest(format!(
            "crx id must be {} bytes, got {}",
            ID_LEN / 2,
            crx_id.len()
        ))
    })?;

    Ok(id_from_digest_bytes(crx_id))
}

pub fn is_valid_extension_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| (b'a'..=b'p').contains(&b))
}
