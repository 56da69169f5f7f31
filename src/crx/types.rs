use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::{
    constants::{CRX2_PREFIX_LENGTH, CRX2_VERSION, CRX3_PREFIX_LENGTH, CRX3_VERSION},
    header::FileHeader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrxVersion {
    Crx2,
    Crx3,
}

impl CrxVersion {
    pub fn from_identifier(identifier: u32) -> Option<Self> {
        match identifier {
            CRX2_VERSION => Some(CrxVersion::Crx2),
            CRX3_VERSION => Some(CrxVersion::Crx3),
            _ => None,
        }
    }

    /// The version tag as written after the magic number.
    pub fn identifier(self) -> u32 {
        match self {
            CrxVersion::Crx2 => CRX2_VERSION,
            CrxVersion::Crx3 => CRX3_VERSION,
        }
    }

    /// Bytes that precede the version-specific header data.
    pub fn prefix_length(self) -> usize {
        match self {
            CrxVersion::Crx2 => CRX2_PREFIX_LENGTH,
            CrxVersion::Crx3 => CRX3_PREFIX_LENGTH,
        }
    }
}

impl fmt::Display for CrxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CRX{}", self.identifier())
    }
}

/// Signing algorithms a header may carry proofs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProofAlgorithm {
    Sha1WithRsa,
    Sha256WithRsa,
    Sha256WithEcdsa,
}

impl ProofAlgorithm {
    pub const ALL: [ProofAlgorithm; 3] = [
        ProofAlgorithm::Sha1WithRsa,
        ProofAlgorithm::Sha256WithRsa,
        ProofAlgorithm::Sha256WithEcdsa,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProofAlgorithm::Sha1WithRsa => "sha1_with_rsa",
            ProofAlgorithm::Sha256WithRsa => "sha256_with_rsa",
            ProofAlgorithm::Sha256WithEcdsa => "sha256_with_ecdsa",
        }
    }
}

impl fmt::Display for ProofAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A public key and the signature made with its private half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricKeyProof {
    public_key: Vec<u8>,
    signature: Vec<u8>,
}

impl AsymmetricKeyProof {
    pub fn new(public_key: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn public_key_base64(&self) -> String {
        BASE64.encode(&self.public_key)
    }

    pub fn signature_base64(&self) -> String {
        BASE64.encode(&self.signature)
    }

    pub fn public_key_length(&self) -> usize {
        self.public_key.len()
    }

    pub fn signature_length(&self) -> usize {
        self.signature.len()
    }

    pub fn combined_length(&self) -> usize {
        self.public_key_length() + self.signature_length()
    }
}

/// Everything learned from a CRX header.
#[derive(Debug)]
pub struct CrxMetadata {
    magic_number: String,
    version: CrxVersion,
    header: Box<dyn FileHeader>,
    id: String,
}

impl CrxMetadata {
    pub(crate) fn new(
        magic_number: String,
        version: CrxVersion,
        header: Box<dyn FileHeader>,
        id: String,
    ) -> Self {
        Self {
            magic_number,
            version,
            header,
            id,
        }
    }

    pub fn magic_number(&self) -> &str {
        &self.magic_number
    }

    pub fn version(&self) -> CrxVersion {
        self.version
    }

    pub fn file_header(&self) -> &dyn FileHeader {
        self.header.as_ref()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Offset of the first payload byte from the start of the file.
    pub fn payload_offset(&self) -> usize {
        self.version.prefix_length() + self.header.header_byte_length()
    }
}

#[derive(Debug)]
pub struct CrxExtension {
    pub metadata: CrxMetadata,
    pub zip: Vec<u8>,
}
