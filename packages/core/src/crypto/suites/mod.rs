//! Криптографические наборы (Crypto Suites)
//!
//! Этот модуль содержит реализации CryptoProvider trait.
//!
//! ## Доступные наборы
//!
//! ### Classic Suite
//! - **Key wrapping**: ECIES на X25519 + HKDF-SHA256 + ChaCha20-Poly1305
//! - **Signatures**: Ed25519 над SHA-256 digest
//! - **Bulk cipher**: AES-128-GCM
//! - **Digest**: SHA-256
//! - **Suite ID**: 1
//!
//! ## Выбор suite
//!
//! ```rust
//! use mixcrypt_core::crypto::suites::classic::ClassicSuiteProvider;
//! use mixcrypt_core::crypto::provider::CryptoProvider;
//! use mixcrypt_core::crypto::random::SystemRandom;
//!
//! type MySuite = ClassicSuiteProvider;
//!
//! let mut rng = SystemRandom::resolve()?;
//! let (private_key, public_key) = MySuite::generate_key_pair(&mut rng)?;
//! assert_eq!(public_key.len(), 64);
//! # Ok::<(), mixcrypt_core::MixCryptoError>(())
//! ```

pub mod classic;
