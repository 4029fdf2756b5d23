//! Источник криптографически стойких случайных байт
//!
//! Источник внедряется в `MixCrypto` при создании. [`SystemRandom`] выбирает
//! лучший доступный источник в фиксированном порядке:
//!
//! ```text
//! Ambient (thread_rng) → Platform (getrandom / window.crypto) → OperatingSystem (OsRng)
//! ```

use crate::error::CryptoError;
use crate::utils::error::{MixCryptoError, Result};
use rand::RngCore;
use rand_core::OsRng;
use tracing::debug;

/// Capability that yields cryptographically secure random bytes.
pub trait RandomSource: Send {
    /// Fills `dest` entirely or fails.
    fn try_fill(&mut self, dest: &mut [u8]) -> std::result::Result<(), CryptoError>;
}

/// Кандидаты в порядке предпочтения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Process-wide CSPRNG (`rand::thread_rng`), reseeded from the OS
    Ambient,
    /// `getrandom`; on wasm32 this is `window.crypto.getRandomValues`
    Platform,
    /// `OsRng`
    OperatingSystem,
}

impl SourceKind {
    pub const RESOLUTION_ORDER: [SourceKind; 3] =
        [SourceKind::Ambient, SourceKind::Platform, SourceKind::OperatingSystem];

    fn fill(self, dest: &mut [u8]) -> std::result::Result<(), CryptoError> {
        match self {
            SourceKind::Ambient => rand::thread_rng().try_fill_bytes(dest).map_err(CryptoError::from),
            SourceKind::Platform => {
                getrandom::getrandom(dest).map_err(|e| CryptoError::RandomSourceError(e.to_string()))
            }
            SourceKind::OperatingSystem => OsRng.try_fill_bytes(dest).map_err(CryptoError::from),
        }
    }
}

/// Системный источник, выбранный при resolve()
#[derive(Debug, Clone, Copy)]
pub struct SystemRandom {
    kind: SourceKind,
}

impl SystemRandom {
    /// Выбрать первый работающий источник в стандартном порядке
    ///
    /// # Errors
    ///
    /// `NoSecureRandomSource`, если ни один кандидат не отдал байты
    pub fn resolve() -> Result<Self> {
        Self::resolve_in_order(&SourceKind::RESOLUTION_ORDER)
    }

    /// Выбрать первый работающий источник из `order`
    pub fn resolve_in_order(order: &[SourceKind]) -> Result<Self> {
        let mut probe = [0u8; 16];
        for &kind in order {
            match kind.fill(&mut probe) {
                Ok(()) => {
                    debug!(target: "mixcrypt::random", source = ?kind, "Random source resolved");
                    return Ok(Self { kind });
                }
                Err(e) => {
                    debug!(target: "mixcrypt::random", source = ?kind, error = %e, "Random source unavailable");
                }
            }
        }
        Err(MixCryptoError::NoSecureRandomSource)
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

impl RandomSource for SystemRandom {
    fn try_fill(&mut self, dest: &mut [u8]) -> std::result::Result<(), CryptoError> {
        self.kind.fill(dest)
    }
}

/// `length` hex-символов из `ceil(length / 2)` случайных байт
pub fn random_hex(source: &mut dyn RandomSource, length: usize) -> Result<String> {
    let mut bytes = vec![0u8; (length + 1) / 2];
    source.try_fill(&mut bytes)?;
    let mut encoded = hex::encode(bytes);
    encoded.truncate(length);
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_prefers_ambient() {
        let rng = SystemRandom::resolve().unwrap();
        assert_eq!(rng.kind(), SourceKind::Ambient);
    }

    #[test]
    fn test_resolve_respects_order() {
        let rng = SystemRandom::resolve_in_order(&[SourceKind::OperatingSystem, SourceKind::Ambient]).unwrap();
        assert_eq!(rng.kind(), SourceKind::OperatingSystem);
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        assert!(matches!(
            SystemRandom::resolve_in_order(&[]),
            Err(MixCryptoError::NoSecureRandomSource)
        ));
    }

    #[test]
    fn test_every_source_fills() {
        for kind in SourceKind::RESOLUTION_ORDER {
            let mut rng = SystemRandom::resolve_in_order(&[kind]).unwrap();
            let mut buf = [0u8; 64];
            rng.try_fill(&mut buf).unwrap();
            assert!(buf.iter().any(|&b| b != 0));
        }
    }

    #[test]
    fn test_random_hex_odd_and_even_lengths() {
        let mut rng = SystemRandom::resolve().unwrap();
        for length in [0, 1, 15, 16, 33] {
            let value = random_hex(&mut rng, length).unwrap();
            assert_eq!(value.len(), length);
            assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_random_hex_is_distinct() {
        let mut rng = SystemRandom::resolve().unwrap();
        let values: HashSet<String> = (0..1000).map(|_| random_hex(&mut rng, 16).unwrap()).collect();
        assert_eq!(values.len(), 1000);
    }
}
