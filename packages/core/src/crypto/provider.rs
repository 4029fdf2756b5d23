//! Defines the CryptoProvider trait for crypto-agility.

use crate::crypto::keys::CipherMode;
use crate::crypto::random::RandomSource;
use crate::error::CryptoError;

/// Trait that formalizes all cryptographic primitives used by the envelope protocol.
/// This enables crypto-agility by allowing different implementations of one suite.
///
/// All keys are raw bytes; hex encoding happens one level up.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Generates a new key pair. Returns `(private_key, public_key)`.
    fn generate_key_pair(rng: &mut dyn RandomSource) -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Derives the public key from a private key.
    fn public_key_from_private(private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Checks that `public_key` is well-formed for this suite.
    fn validate_public_key(public_key: &[u8]) -> Result<(), CryptoError>;

    /// Encrypts a short byte string so that only the holder of the matching
    /// private key can recover it. `mode` selects the ciphertext layout.
    fn asymmetric_encrypt(
        public_key: &[u8],
        plaintext: &[u8],
        mode: CipherMode,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Inverse of [`CryptoProvider::asymmetric_encrypt`].
    fn asymmetric_decrypt(
        private_key: &[u8],
        ciphertext: &[u8],
        mode: CipherMode,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Signs a digest with the given private key.
    fn sign(private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verifies a signature over a digest with the given public key.
    fn verify(public_key: &[u8], digest: &[u8], signature: &[u8]) -> Result<(), CryptoError>;

    /// Encrypts `plaintext` under a symmetric key.
    fn symmetric_encrypt(
        key: &[u8],
        plaintext: &[u8],
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Inverse of [`CryptoProvider::symmetric_encrypt`].
    fn symmetric_decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Message digest.
    fn digest(data: &[u8]) -> Vec<u8>;

    /// Returns the SuiteID associated with this CryptoProvider.
    fn suite_id() -> u16;
}
