pub mod archive;
pub mod constants;
pub mod errors;
pub mod header;
pub mod id;
pub mod interpreter;
pub mod message;
pub mod packer;
pub mod parser;
pub mod reader;
pub mod types;

pub use errors::{CrxError, CrxErrorKind, CrxResult};
pub use header::FileHeader;
pub use id::{extension_id_from_public_key, translate_digest_to_id};
pub use packer::{Crx2Packer, CrxKeyPair, RsaKeyPair};
pub use parser::{parse_crx, parse_metadata};
pub use types::{AsymmetricKeyProof, CrxExtension, CrxMetadata, CrxVersion, ProofAlgorithm};
