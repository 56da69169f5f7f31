use std::{collections::BTreeMap, fmt};

use prost::Message;

use super::{
    id::extension_id_from_crx_id,
    message,
    types::{AsymmetricKeyProof, ProofAlgorithm},
};

/// Proofs carried by a CRX header, whatever its version.
pub trait FileHeader: fmt::Debug + Send + Sync {
    /// Proofs for `algorithm`, in the order they were declared.
    fn asymmetric_key_proofs(&self, algorithm: ProofAlgorithm) -> Vec<AsymmetricKeyProof>;

    /// Every proof, grouped by algorithm.
    fn all_asymmetric_key_proofs(&self) -> Vec<(ProofAlgorithm, AsymmetricKeyProof)> {
        ProofAlgorithm::ALL
            .iter()
            .flat_map(|&algorithm| {
                self.asymmetric_key_proofs(algorithm)
                    .into_iter()
                    .map(move |proof| (algorithm, proof))
            })
            .collect()
    }

    /// Length of the version-specific header data, excluding the magic
    /// number, the version and the length fields.
    fn header_byte_length(&self) -> usize;

    /// Extension id stated by the header itself, if the format has one.
    fn declared_id(&self) -> Option<String> {
        None
    }
}

/// Header built directly from proofs, as read from a CRX2 file.
#[derive(Debug, Clone, Default)]
pub struct MapFileHeader {
    proofs: BTreeMap<ProofAlgorithm, Vec<AsymmetricKeyProof>>,
    num_bytes: usize,
}

impl MapFileHeader {
    pub fn new(proofs: BTreeMap<ProofAlgorithm, Vec<AsymmetricKeyProof>>) -> Self {
        let num_bytes = proofs
            .values()
            .flatten()
            .map(AsymmetricKeyProof::combined_length)
            .sum();

        Self { proofs, num_bytes }
    }

    pub fn single(algorithm: ProofAlgorithm, proof: AsymmetricKeyProof) -> Self {
        Self::new(BTreeMap::from([(algorithm, vec![proof])]))
    }
}

impl FileHeader for MapFileHeader {
    fn asymmetric_key_proofs(&self, algorithm: ProofAlgorithm) -> Vec<AsymmetricKeyProof> {
        self.proofs.get(&algorithm).cloned().unwrap_or_default()
    }

    fn all_asymmetric_key_proofs(&self) -> Vec<(ProofAlgorithm, AsymmetricKeyProof)> {
        self.proofs
            .iter()
            .flat_map(|(&algorithm, proofs)| proofs.iter().map(move |p| (algorithm, p.clone())))
            .collect()
    }

    fn header_byte_length(&self) -> usize {
        self.num_bytes
    }
}

/// Header backed by a decoded CRX3 `CrxFileHeader` message.
#[derive(Debug, Clone)]
pub struct MessageFileHeader {
    message: message::CrxFileHeader,
    num_bytes: usize,
}

impl MessageFileHeader {
    pub fn new(message: message::CrxFileHeader, num_bytes: usize) -> Self {
        Self { message, num_bytes }
    }

    pub fn message(&self) -> &message::CrxFileHeader {
        &self.message
    }

    fn proof_messages(&self, algorithm: ProofAlgorithm) -> &[message::AsymmetricKeyProof] {
        match algorithm {
            ProofAlgorithm::Sha256WithRsa => &self.message.sha256_with_rsa,
            ProofAlgorithm::Sha256WithEcdsa => &self.message.sha256_with_ecdsa,
            ProofAlgorithm::Sha1WithRsa => &[],
        }
    }
}

impl FileHeader for MessageFileHeader {
    fn asymmetric_key_proofs(&self, algorithm: ProofAlgorithm) -> Vec<AsymmetricKeyProof> {
        self.proof_messages(algorithm)
            .iter()
            .map(|proof| {
                AsymmetricKeyProof::new(
                    proof.public_key.clone().unwrap_or_default(),
                    proof.signature.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    fn header_byte_length(&self) -> usize {
        self.num_bytes
    }

    fn declared_id(&self) -> Option<String> {
        let signed_data = self.message.signed_header_data.as_deref()?;
        let crx_id = message::SignedData::decode(signed_data).ok()?.crx_id?;

        extension_id_from_crx_id(&crx_id).ok()
    }
}
