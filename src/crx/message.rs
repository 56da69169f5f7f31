//! CRX3 header messages.
//!
//! Mirrors `components/crx_file/crx3.proto` from Chromium. Field numbers are
//! part of the file format and must not change.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CrxFileHeader {
    #[prost(message, repeated, tag = "2")]
    pub sha256_with_rsa: Vec<AsymmetricKeyProof>,
    #[prost(message, repeated, tag = "3")]
    pub sha256_with_ecdsa: Vec<AsymmetricKeyProof>,
    /// Serialized [`SignedData`].
    #[prost(bytes = "vec", optional, tag = "10000")]
    pub signed_header_data: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AsymmetricKeyProof {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub public_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedData {
    /// First 16 bytes of the SHA-256 of the signing public key.
    #[prost(bytes = "vec", optional, tag = "1")]
    pub crx_id: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn decodes_hand_encoded_header() {
        // field 2 (sha256_with_rsa), 7 bytes:
        //   field 1 (public_key) = [aa], field 2 (signature) = [bb cc]
        // field 10000 (signed_header_data), 4 bytes:
        //   field 1 (crx_id) = [01 02]
        let bytes = [
            0x12, 0x07, 0x0a, 0x01, 0xaa, 0x12, 0x02, 0xbb, 0xcc, //
            0x82, 0xf1, 0x04, 0x04, 0x0a, 0x02, 0x01, 0x02,
        ];

        let header = CrxFileHeader::decode(&bytes[..]).unwrap();

        assert_eq!(header.sha256_with_rsa.len(), 1);
        assert!(header.sha256_with_ecdsa.is_empty());
        let proof = &header.sha256_with_rsa[0];
        assert_eq!(proof.public_key.as_deref(), Some(&[0xaa][..]));
        assert_eq!(proof.signature.as_deref(), Some(&[0xbb, 0xcc][..]));

        let signed = SignedData::decode(header.signed_header_data.unwrap().as_slice()).unwrap();
        assert_eq!(signed.crx_id, Some(vec![0x01, 0x02]));
    }

    #[test]
    fn truncated_message_fails_to_decode() {
        let bytes = [0x12, 0x07, 0x0a, 0x01, 0xaa];

        assert!(CrxFileHeader::decode(&bytes[..]).is_err());
    }

    #[test]
    fn encoding_keeps_declaration_order() {
        let header = CrxFileHeader {
            sha256_with_rsa: vec![
                AsymmetricKeyProof {
                    public_key: Some(vec![1]),
                    signature: Some(vec![2]),
                },
                AsymmetricKeyProof {
                    public_key: Some(vec![3]),
                    signature: Some(vec![4]),
                },
            ],
            ..Default::default()
        };

        let decoded = CrxFileHeader::decode(header.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, header);
    }
}
