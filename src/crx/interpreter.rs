use std::io::Read;

use prost::Message;
use tracing::debug;

use super::{
    constants::{CRX2_MAX_PUBLIC_KEY_LENGTH, CRX2_MAX_SIGNATURE_LENGTH, CRX3_MAX_HEADER_LENGTH},
    errors::{CrxError, CrxResult},
    header::{FileHeader, MapFileHeader, MessageFileHeader},
    id::extension_id_from_public_key,
    message,
    reader::CrxReader,
    types::{AsymmetricKeyProof, CrxMetadata, CrxVersion, ProofAlgorithm},
};

/// Decodes the part of a CRX header that follows the version tag.
pub trait CrxInterpreter: Sync {
    fn version(&self) -> CrxVersion;

    /// Consumes exactly the header from `input`, leaving the payload unread.
    fn parse_metadata_after_version(
        &self,
        magic_number: String,
        input: &mut dyn Read,
    ) -> CrxResult<CrxMetadata>;
}

impl CrxVersion {
    pub fn interpreter(self) -> &'static dyn CrxInterpreter {
        match self {
            CrxVersion::Crx2 => &Crx2Interpreter,
            CrxVersion::Crx3 => &Crx3Interpreter,
        }
    }
}

fn check_length(field: &'static str, length: u32, max: u32) -> CrxResult<usize> {
    if length == 0 || length > max {
        return Err(CrxError::InsaneLength { field, length });
    }

    Ok(length as usize)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Crx2Interpreter;

impl CrxInterpreter for Crx2Interpreter {
    fn version(&self) -> CrxVersion {
        CrxVersion::Crx2
    }

    fn parse_metadata_after_version(
        &self,
        magic_number: String,
        input: &mut dyn Read,
    ) -> CrxResult<CrxMetadata> {
        let mut reader = CrxReader::new(input);

        let public_key_length = reader.read_u32_le()?;
        let signature_length = reader.read_u32_le()?;
        let public_key_length =
            check_length("public key", public_key_length, CRX2_MAX_PUBLIC_KEY_LENGTH)?;
        let signature_length =
            check_length("signature", signature_length, CRX2_MAX_SIGNATURE_LENGTH)?;
        debug!(public_key_length, signature_length, "reading CRX2 header");

        let public_key = reader.read_bytes(public_key_length)?;
        let signature = reader.read_bytes(signature_length)?;

        let id = extension_id_from_public_key(&public_key);
        let header = MapFileHeader::single(
            ProofAlgorithm::Sha1WithRsa,
            AsymmetricKeyProof::new(public_key, signature),
        );

        Ok(CrxMetadata::new(
            magic_number,
            self.version(),
            Box::new(header),
            id,
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Crx3Interpreter;

impl CrxInterpreter for Crx3Interpreter {
    fn version(&self) -> CrxVersion {
        CrxVersion::Crx3
    }

    fn parse_metadata_after_version(
        &self,
        magic_number: String,
        input: &mut dyn Read,
    ) -> CrxResult<CrxMetadata> {
        let mut reader = CrxReader::new(input);

        let header_length = reader.read_u32_le()?;
        let header_length = check_length("header", header_length, CRX3_MAX_HEADER_LENGTH)?;
        debug!(header_length, "reading CRX3 header");

        let header_bytes = reader.read_bytes(header_length)?;
        let message = message::CrxFileHeader::decode(header_bytes.as_slice())?;
        let header = MessageFileHeader::new(message, header_length);

        // The id always comes from the first sha256_with_rsa proof.
        let proof = header
            .asymmetric_key_proofs(ProofAlgorithm::Sha256WithRsa)
            .into_iter()
            .next()
            .ok_or(CrxError::MissingProof(ProofAlgorithm::Sha256WithRsa))?;
        let id = extension_id_from_public_key(proof.public_key());

        Ok(CrxMetadata::new(
            magic_number,
            self.version(),
            Box::new(header),
            id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn crx2_body(public_key: &[u8], signature: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&(public_key.len() as u32).to_le_bytes());
        body.extend_from_slice(&(signature.len() as u32).to_le_bytes());
        body.extend_from_slice(public_key);
        body.extend_from_slice(signature);
        body
    }

    fn crx3_body(header: &message::CrxFileHeader) -> Vec<u8> {
        let encoded = header.encode_to_vec();
        let mut body = (encoded.len() as u32).to_le_bytes().to_vec();
        body.extend_from_slice(&encoded);
        body
    }

    fn proof(key: &[u8], sig: &[u8]) -> message::AsymmetricKeyProof {
        message::AsymmetricKeyProof {
            public_key: Some(key.to_vec()),
            signature: Some(sig.to_vec()),
        }
    }

    fn parse(interpreter: &dyn CrxInterpreter, body: Vec<u8>) -> CrxResult<CrxMetadata> {
        interpreter.parse_metadata_after_version("Cr24".to_string(), &mut Cursor::new(body))
    }

    #[test]
    fn crx2_single_sha1_proof() {
        let metadata = parse(&Crx2Interpreter, crx2_body(b"abc", b"signature")).unwrap();

        assert_eq!(metadata.version(), CrxVersion::Crx2);
        assert_eq!(metadata.id(), "lkhibglpipabmpokebebeanofnkocccd");
        let all = metadata.file_header().all_asymmetric_key_proofs();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, ProofAlgorithm::Sha1WithRsa);
        assert_eq!(all[0].1.public_key_base64(), "YWJj");
        assert_eq!(all[0].1.signature(), b"signature");
        assert_eq!(metadata.file_header().header_byte_length(), 12);
        assert_eq!(metadata.payload_offset(), 28);
    }

    #[test]
    fn crx2_length_bounds() {
        for (key_len, ok) in [(0usize, false), (1, true), (32768, true), (32769, false)] {
            let body = crx2_body(&vec![7u8; key_len], b"s");
            let result = parse(&Crx2Interpreter, body);
            assert_eq!(result.is_ok(), ok, "public key length {key_len}");
            if let Err(err) = result {
                assert!(err.is_format_error());
            }
        }

        for (sig_len, ok) in [(0usize, false), (1, true), (65536, true), (65537, false)] {
            let body = crx2_body(b"k", &vec![7u8; sig_len]);
            let result = parse(&Crx2Interpreter, body);
            assert_eq!(result.is_ok(), ok, "signature length {sig_len}");
        }
    }

    #[test]
    fn crx2_insane_length_checked_before_reading_blocks() {
        let mut body = Vec::new();
        body.extend_from_slice(&u32::MAX.to_le_bytes());
        body.extend_from_slice(&1u32.to_le_bytes());

        let err = parse(&Crx2Interpreter, body).unwrap_err();
        assert!(matches!(
            err,
            CrxError::InsaneLength {
                field: "public key",
                length: u32::MAX
            }
        ));
    }

    #[test]
    fn crx2_truncated_blocks_are_end_of_stream() {
        let mut body = crx2_body(b"public key", b"signature");
        body.truncate(body.len() - 1);

        let err = parse(&Crx2Interpreter, body).unwrap_err();
        assert!(err.is_end_of_stream(), "unexpected error: {err:?}");
    }

    #[test]
    fn crx3_id_comes_from_first_sha256_rsa_proof() {
        let header = message::CrxFileHeader {
            sha256_with_rsa: vec![proof(b"abc", b"s1"), proof(b"other", b"s2")],
            sha256_with_ecdsa: vec![proof(b"ecdsa", b"s3")],
            signed_header_data: None,
        };
        let encoded_len = header.encoded_len();

        let metadata = parse(&Crx3Interpreter, crx3_body(&header)).unwrap();

        assert_eq!(metadata.version(), CrxVersion::Crx3);
        assert_eq!(metadata.id(), "lkhibglpipabmpokebebeanofnkocccd");
        assert_eq!(metadata.file_header().all_asymmetric_key_proofs().len(), 3);
        assert_eq!(metadata.file_header().header_byte_length(), encoded_len);
        assert_eq!(metadata.payload_offset(), 12 + encoded_len);
    }

    #[test]
    fn crx3_without_sha256_rsa_proof_is_rejected() {
        let header = message::CrxFileHeader {
            sha256_with_ecdsa: vec![proof(b"ecdsa", b"sig")],
            ..Default::default()
        };

        let err = parse(&Crx3Interpreter, crx3_body(&header)).unwrap_err();
        assert!(matches!(
            err,
            CrxError::MissingProof(ProofAlgorithm::Sha256WithRsa)
        ));
        assert!(err.is_format_error());
    }

    #[test]
    fn crx3_header_length_bounds() {
        for length in [0u32, 128 * 1024 + 1] {
            let err = parse(&Crx3Interpreter, length.to_le_bytes().to_vec()).unwrap_err();
            assert!(err.is_format_error(), "header length {length}");
        }
    }

    #[test]
    fn crx3_garbage_header_is_format_error() {
        let mut body = 4u32.to_le_bytes().to_vec();
        body.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);

        let err = parse(&Crx3Interpreter, body).unwrap_err();
        assert!(matches!(err, CrxError::MalformedHeader(_)));
    }

    #[test]
    fn dispatch_by_version() {
        assert_eq!(CrxVersion::Crx2.interpreter().version(), CrxVersion::Crx2);
        assert_eq!(CrxVersion::Crx3.interpreter().version(), CrxVersion::Crx3);
    }
}
