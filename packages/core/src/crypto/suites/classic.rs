use crate::config::Config;
use crate::crypto::keys::CipherMode;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::random::RandomSource;
use crate::error::CryptoError;
use aes_gcm::Aes128Gcm;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key as AeadKeyChacha, Nonce,
};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

const SEED_SALT: &[u8] = b"MixCrypt-Classic-Seed-v1";
const X25519_INFO: &[u8] = b"MixCrypt-Classic-X25519";
const ED25519_INFO: &[u8] = b"MixCrypt-Classic-Ed25519";
const WRAP_INFO: &[u8] = b"MixCrypt-Classic-Key-Wrap";

/// Concrete implementation of `CryptoProvider` for the classic suite.
///
/// Private key is a 32-byte seed, public key is `X25519 public || Ed25519 verifying key`.
pub struct ClassicSuiteProvider;

/// Expands the seed into the encryption and signing halves of the key pair.
fn expand_seed(seed: &[u8]) -> Result<(StaticSecret, SigningKey), CryptoError> {
    let seed: &[u8; 32] = seed
        .try_into()
        .map_err(|_| CryptoError::InvalidInputError("Invalid private key length".to_string()))?;

    let hkdf = Hkdf::<Sha256>::new(Some(SEED_SALT), seed);

    let mut x25519_bytes = Zeroizing::new([0u8; 32]);
    hkdf.expand(X25519_INFO, &mut *x25519_bytes)?;
    let mut ed25519_bytes = Zeroizing::new([0u8; 32]);
    hkdf.expand(ED25519_INFO, &mut *ed25519_bytes)?;

    Ok((StaticSecret::from(*x25519_bytes), SigningKey::from_bytes(&ed25519_bytes)))
}

fn split_public_key(public_key: &[u8]) -> Result<(X25519PublicKey, VerifyingKey), CryptoError> {
    if public_key.len() != Config::global().public_key_size {
        return Err(CryptoError::InvalidInputError("Invalid public key length".to_string()));
    }
    let (kem_part, sig_part) = public_key.split_at(32);

    let kem_bytes: [u8; 32] = kem_part
        .try_into()
        .map_err(|_| CryptoError::InvalidInputError("Invalid X25519 public key".to_string()))?;
    let sig_bytes: &[u8; 32] = sig_part
        .try_into()
        .map_err(|_| CryptoError::InvalidInputError("Invalid verifying key length".to_string()))?;
    let verifying_key = VerifyingKey::from_bytes(sig_bytes)
        .map_err(|e| CryptoError::InvalidInputError(format!("Invalid verifying key: {}", e)))?;

    Ok((X25519PublicKey::from(kem_bytes), verifying_key))
}

/// One-time key for wrapping, bound to both the ephemeral and the recipient key.
fn derive_wrap_key(
    ephemeral_public: &X25519PublicKey,
    recipient_public: &X25519PublicKey,
    shared_secret: &[u8],
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public.as_bytes()), shared_secret);
    let mut info = Vec::with_capacity(WRAP_INFO.len() + 32);
    info.extend_from_slice(WRAP_INFO);
    info.extend_from_slice(recipient_public.as_bytes());

    let mut okm = Zeroizing::new([0u8; 32]);
    hkdf.expand(&info, &mut *okm)?;
    Ok(okm)
}

impl CryptoProvider for ClassicSuiteProvider {
    fn generate_key_pair(rng: &mut dyn RandomSource) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let mut seed = Zeroizing::new(vec![0u8; Config::global().private_key_size]);
        rng.try_fill(&mut seed)
            .map_err(|e| CryptoError::KeyGenerationError(e.to_string()))?;
        let public_key = Self::public_key_from_private(&seed)?;
        Ok((seed.to_vec(), public_key))
    }

    fn public_key_from_private(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let (static_secret, signing_key) = expand_seed(private_key)?;
        let kem_public = X25519PublicKey::from(&static_secret);

        let mut public_key = Vec::with_capacity(Config::global().public_key_size);
        public_key.extend_from_slice(kem_public.as_bytes());
        public_key.extend_from_slice(signing_key.verifying_key().as_bytes());
        Ok(public_key)
    }

    fn validate_public_key(public_key: &[u8]) -> Result<(), CryptoError> {
        split_public_key(public_key).map(|_| ())
    }

    fn asymmetric_encrypt(
        public_key: &[u8],
        plaintext: &[u8],
        mode: CipherMode,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<u8>, CryptoError> {
        let (recipient_public, _) = split_public_key(public_key)?;

        let mut ephemeral_bytes = Zeroizing::new([0u8; 32]);
        rng.try_fill(&mut *ephemeral_bytes)?;
        let ephemeral_secret = StaticSecret::from(*ephemeral_bytes);
        let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);

        let shared_secret = ephemeral_secret.diffie_hellman(&recipient_public);
        if !shared_secret.was_contributory() {
            return Err(CryptoError::KeyWrapError("Non-contributory shared secret".to_string()));
        }

        let wrap_key = derive_wrap_key(&ephemeral_public, &recipient_public, shared_secret.as_bytes())?;
        let cipher = ChaCha20Poly1305::new(AeadKeyChacha::from_slice(&*wrap_key));
        // Ключ одноразовый, поэтому нулевой nonce безопасен
        let sealed = cipher
            .encrypt(Nonce::from_slice(&[0u8; 12]), plaintext)
            .map_err(|e| CryptoError::KeyWrapError(e.to_string()))?;

        let tag_length = Config::global().tag_length;
        let (body, tag) = sealed.split_at(sealed.len() - tag_length);

        let mut out = Vec::with_capacity(32 + sealed.len());
        out.extend_from_slice(ephemeral_public.as_bytes());
        match mode {
            CipherMode::C1C2C3 => {
                out.extend_from_slice(body);
                out.extend_from_slice(tag);
            }
            CipherMode::C1C3C2 => {
                out.extend_from_slice(tag);
                out.extend_from_slice(body);
            }
        }
        Ok(out)
    }

    fn asymmetric_decrypt(
        private_key: &[u8],
        ciphertext: &[u8],
        mode: CipherMode,
    ) -> Result<Vec<u8>, CryptoError> {
        let config = Config::global();
        if ciphertext.len() < config.ephemeral_key_size + config.tag_length {
            return Err(CryptoError::KeyUnwrapError("Wrapped key too short".to_string()));
        }

        let (static_secret, _) = expand_seed(private_key)?;
        let recipient_public = X25519PublicKey::from(&static_secret);

        let (c1, rest) = ciphertext.split_at(config.ephemeral_key_size);
        let ephemeral_bytes: [u8; 32] = c1
            .try_into()
            .map_err(|_| CryptoError::KeyUnwrapError("Invalid ephemeral key".to_string()))?;
        let ephemeral_public = X25519PublicKey::from(ephemeral_bytes);

        let mut sealed = Vec::with_capacity(rest.len());
        match mode {
            CipherMode::C1C2C3 => sealed.extend_from_slice(rest),
            CipherMode::C1C3C2 => {
                let (tag, body) = rest.split_at(config.tag_length);
                sealed.extend_from_slice(body);
                sealed.extend_from_slice(tag);
            }
        }

        let shared_secret = static_secret.diffie_hellman(&ephemeral_public);
        if !shared_secret.was_contributory() {
            return Err(CryptoError::KeyUnwrapError("Non-contributory shared secret".to_string()));
        }

        let wrap_key = derive_wrap_key(&ephemeral_public, &recipient_public, shared_secret.as_bytes())?;
        let cipher = ChaCha20Poly1305::new(AeadKeyChacha::from_slice(&*wrap_key));
        cipher
            .decrypt(Nonce::from_slice(&[0u8; 12]), sealed.as_slice())
            .map_err(|e| CryptoError::KeyUnwrapError(e.to_string()))
    }

    fn sign(private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let (_, signing_key) = expand_seed(private_key)?;
        let signature = signing_key.sign(digest);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(public_key: &[u8], digest: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let (_, verifying_key) = split_public_key(public_key)?;

        if signature.len() != Config::global().signature_size {
            return Err(CryptoError::InvalidInputError("Invalid signature length".to_string()));
        }
        let signature_obj = Signature::from_slice(signature)
            .map_err(|e| CryptoError::InvalidInputError(e.to_string()))?;

        verifying_key
            .verify_strict(digest, &signature_obj)
            .map_err(|e| CryptoError::SignatureVerificationError(e.to_string()))
    }

    fn symmetric_encrypt(
        key: &[u8],
        plaintext: &[u8],
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes128Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidInputError("Invalid symmetric key length".to_string()))?;

        let nonce_length = Config::global().nonce_length;
        let mut nonce_bytes = vec![0u8; nonce_length];
        rng.try_fill(&mut nonce_bytes)?;

        let ciphertext = cipher
            .encrypt(aes_gcm::Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| CryptoError::AeadEncryptionError(e.to_string()))?;

        // nonce + ciphertext
        let mut result = Vec::with_capacity(nonce_length + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    fn symmetric_decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes128Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidInputError("Invalid symmetric key length".to_string()))?;

        let nonce_length = Config::global().nonce_length;
        if ciphertext.len() < nonce_length {
            return Err(CryptoError::AeadDecryptionError(
                "Invalid ciphertext: too short".to_string(),
            ));
        }

        let (nonce_bytes, body) = ciphertext.split_at(nonce_length);
        cipher
            .decrypt(aes_gcm::Nonce::from_slice(nonce_bytes), body)
            .map_err(|e| CryptoError::AeadDecryptionError(e.to_string()))
    }

    fn digest(data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn suite_id() -> u16 {
        Config::global().classic_suite_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random::SystemRandom;

    fn rng() -> SystemRandom {
        SystemRandom::resolve().unwrap()
    }

    #[test]
    fn test_public_key_derivation_is_deterministic() {
        let (private_key, public_key) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        assert_eq!(private_key.len(), 32);
        assert_eq!(public_key.len(), 64);
        assert_eq!(
            ClassicSuiteProvider::public_key_from_private(&private_key).unwrap(),
            public_key
        );
    }

    #[test]
    fn test_wrap_unwrap_both_modes() {
        let (private_key, public_key) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        let secret = b"0123456789abcdef0123456789abcdef";

        for mode in [CipherMode::C1C2C3, CipherMode::C1C3C2] {
            let wrapped =
                ClassicSuiteProvider::asymmetric_encrypt(&public_key, secret, mode, &mut rng()).unwrap();
            assert_eq!(wrapped.len(), 32 + secret.len() + 16);
            let unwrapped = ClassicSuiteProvider::asymmetric_decrypt(&private_key, &wrapped, mode).unwrap();
            assert_eq!(unwrapped, secret);
        }
    }

    #[test]
    fn test_mode_mismatch_fails() {
        let (private_key, public_key) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        let wrapped = ClassicSuiteProvider::asymmetric_encrypt(
            &public_key,
            b"secret key material",
            CipherMode::C1C3C2,
            &mut rng(),
        )
        .unwrap();
        let result = ClassicSuiteProvider::asymmetric_decrypt(&private_key, &wrapped, CipherMode::C1C2C3);
        assert!(matches!(result, Err(CryptoError::KeyUnwrapError(_))));
    }

    #[test]
    fn test_unwrap_with_wrong_private_key_fails() {
        let (_, public_key) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        let (other_private, _) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        let wrapped = ClassicSuiteProvider::asymmetric_encrypt(
            &public_key,
            b"secret",
            CipherMode::C1C3C2,
            &mut rng(),
        )
        .unwrap();
        assert!(ClassicSuiteProvider::asymmetric_decrypt(&other_private, &wrapped, CipherMode::C1C3C2).is_err());
    }

    #[test]
    fn test_sign_verify_digest() {
        let (private_key, public_key) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        let digest = ClassicSuiteProvider::digest(b"{\"a\":1}");
        assert_eq!(digest.len(), 32);

        let signature = ClassicSuiteProvider::sign(&private_key, &digest).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(ClassicSuiteProvider::verify(&public_key, &digest, &signature).is_ok());

        let other = ClassicSuiteProvider::digest(b"{\"a\":2}");
        assert!(matches!(
            ClassicSuiteProvider::verify(&public_key, &other, &signature),
            Err(CryptoError::SignatureVerificationError(_))
        ));
    }

    #[test]
    fn test_verify_rejects_truncated_signature() {
        let (private_key, public_key) = ClassicSuiteProvider::generate_key_pair(&mut rng()).unwrap();
        let digest = ClassicSuiteProvider::digest(b"[1,2,3]");
        let signature = ClassicSuiteProvider::sign(&private_key, &digest).unwrap();

        assert!(matches!(
            ClassicSuiteProvider::verify(&public_key, &digest, &signature[..63]),
            Err(CryptoError::InvalidInputError(_))
        ));
    }

    #[test]
    fn test_symmetric_roundtrip_and_wrong_key() {
        let key = [7u8; 16];
        let ciphertext = ClassicSuiteProvider::symmetric_encrypt(&key, b"payload", &mut rng()).unwrap();
        assert_eq!(ciphertext.len(), 12 + 7 + 16);
        assert_eq!(ClassicSuiteProvider::symmetric_decrypt(&key, &ciphertext).unwrap(), b"payload");
        assert!(ClassicSuiteProvider::symmetric_decrypt(&[8u8; 16], &ciphertext).is_err());
    }

    #[test]
    fn test_symmetric_rejects_wrong_key_size() {
        let result = ClassicSuiteProvider::symmetric_encrypt(&[0u8; 32], b"payload", &mut rng());
        assert!(matches!(result, Err(CryptoError::InvalidInputError(_))));
    }

    #[test]
    fn test_invalid_public_key_rejected() {
        assert!(ClassicSuiteProvider::validate_public_key(&[1u8; 10]).is_err());
    }
}
