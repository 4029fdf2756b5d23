// MixCrypt Core
// Hybrid envelope encryption: symmetric payload key, asymmetric key wrapping,
// signed payloads and a key renewal handshake between two peers

#![warn(clippy::all)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;
pub mod utils;

// Re-exports для удобства
pub use config::{Config, MixCryptoOptions};
pub use crypto::keys::{CipherMode, KeyPair, KeyStore, PairingState, PeerPublicKey};
pub use crypto::mix_cipher::{MixCrypto, MixEncryptResult, RenewalRequest, Verification};
pub use crypto::random::{random_hex, RandomSource, SourceKind, SystemRandom};
pub use crypto::suites::classic::ClassicSuiteProvider;
pub use error::CryptoError;
pub use utils::error::{MixCryptoError, Result};
