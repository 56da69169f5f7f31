use std::io::Write;

use rsa::{
    pkcs1::DecodeRsaPrivateKey,
    pkcs1v15::SigningKey,
    pkcs8::{DecodePrivateKey, EncodePublicKey},
    signature::{SignatureEncoding, Signer},
    RsaPrivateKey,
};
use sha1::Sha1;
use tracing::debug;

use super::{
    constants::{CRX_MAGIC_VALUE, PACK_MAX_PUBLIC_KEY_LENGTH, PACK_MAX_SIGNATURE_LENGTH},
    errors::{CrxError, CrxResult},
    types::CrxVersion,
};

/// Key material used to sign a package.
pub trait CrxKeyPair {
    /// DER-encoded SubjectPublicKeyInfo, as embedded in the header.
    fn public_key_bytes(&self) -> CrxResult<Vec<u8>>;

    /// Signs `payload` with the private key.
    fn sign(&self, payload: &[u8]) -> CrxResult<Vec<u8>>;
}

/// RSA key pair producing PKCS#1 v1.5 signatures over SHA-1 digests.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    private_key: RsaPrivateKey,
}

impl RsaKeyPair {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        Self { private_key }
    }

    /// Loads a PKCS#8 or PKCS#1 PEM-encoded private key.
    pub fn from_pem(pem: &str) -> CrxResult<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|err| CrxError::Key(format!("failed to load RSA private key: {err}")))?;

        Ok(Self::new(private_key))
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }
}

impl CrxKeyPair for RsaKeyPair {
    fn public_key_bytes(&self) -> CrxResult<Vec<u8>> {
        let der = self
            .private_key
            .to_public_key()
            .to_public_key_der()
            .map_err(|err| CrxError::Key(format!("failed to encode public key: {err}")))?;

        Ok(der.as_bytes().to_vec())
    }

    fn sign(&self, payload: &[u8]) -> CrxResult<Vec<u8>> {
        let signing_key = SigningKey::<Sha1>::new(self.private_key.clone());
        let signature = signing_key
            .try_sign(payload)
            .map_err(|err| CrxError::Key(format!("failed to sign payload: {err}")))?;

        Ok(signature.to_vec())
    }
}

/// Writes CRX2 packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crx2Packer;

impl Crx2Packer {
    pub fn crx_version(&self) -> CrxVersion {
        CrxVersion::Crx2
    }

    /// Signs `zip` and returns the complete package: header then `zip`.
    pub fn pack_extension(&self, zip: &[u8], key_pair: &dyn CrxKeyPair) -> CrxResult<Vec<u8>> {
        let mut output = Vec::with_capacity(zip.len() + 1024);
        self.pack_extension_to(zip, key_pair, &mut output)?;

        Ok(output)
    }

    pub fn pack_extension_to<W: Write>(
        &self,
        zip: &[u8],
        key_pair: &dyn CrxKeyPair,
        output: &mut W,
    ) -> CrxResult<()> {
        let public_key = key_pair.public_key_bytes()?;
        let signature = key_pair.sign(zip)?;

        self.write_extension_header(&public_key, &signature, output)?;
        output.write_all(zip)?;
        output.flush()?;

        Ok(())
    }

    pub fn write_extension_header<W: Write>(
        &self,
        public_key: &[u8],
        signature: &[u8],
        output: &mut W,
    ) -> CrxResult<()> {
        if public_key.len() > PACK_MAX_PUBLIC_KEY_LENGTH {
            return Err(CrxError::Argument(format!(
                "public key length is insane: {}",
                public_key.len()
            )));
        }
        if signature.len() > PACK_MAX_SIGNATURE_LENGTH {
            return Err(CrxError::Argument(format!(
                "signature length is insane: {}",
                signature.len()
            )));
        }
        debug!(
            public_key_length = public_key.len(),
            signature_length = signature.len(),
            "writing CRX2 header"
        );

        output.write_all(&CRX_MAGIC_VALUE)?;
        output.write_all(&self.crx_version().identifier().to_le_bytes())?;
        output.write_all(&(public_key.len() as u32).to_le_bytes())?;
        output.write_all(&(signature.len() as u32).to_le_bytes())?;
        output.write_all(public_key)?;
        output.write_all(signature)?;

        Ok(())
    }
}
