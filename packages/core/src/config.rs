//! Централизованная конфигурация для MixCrypt Core
//!
//! Здесь живут только константы протокола. Ключевой материал сюда не попадает:
//! ключи принадлежат конкретному экземпляру `MixCrypto` (см. [`MixCryptoOptions`]).

use crate::crypto::keys::CipherMode;
use crate::utils::error::{MixCryptoError, Result};
use serde::Deserialize;
use std::sync::OnceLock;

/// Глобальная конфигурация протокола (синглтон, только константы)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // КРИПТОГРАФИЧЕСКИЕ ПАРАМЕТРЫ
    // ============================================

    /// Длина симметричного ключа в hex-символах (16 байт = 32 символа)
    pub symmetric_key_hex_length: usize,

    /// Длина nonce для AES-GCM (в байтах)
    pub nonce_length: usize,

    /// Размер GCM / Poly1305 authentication tag (в байтах)
    pub tag_length: usize,

    /// Длина seed приватного ключа (в байтах)
    pub private_key_size: usize,

    /// Размер публичного ключа: X25519 (32) + Ed25519 (32)
    pub public_key_size: usize,

    /// Размер X25519 ephemeral ключа внутри wrapped key (в байтах)
    pub ephemeral_key_size: usize,

    /// Размер Ed25519 подписи (в байтах)
    pub signature_size: usize,

    /// ID классического криптографического набора (Classic Suite)
    pub classic_suite_id: u16,

    // ============================================
    // ПАРАМЕТРЫ ПО УМОЛЧАНИЮ
    // ============================================

    /// Режим кодирования asymmetric ciphertext (0 = C1C2C3, 1 = C1C3C2)
    pub default_cipher_mode: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symmetric_key_hex_length: 32,
            nonce_length: 12,
            tag_length: 16,
            private_key_size: 32,
            public_key_size: 64,
            ephemeral_key_size: 32,
            signature_size: 64,
            classic_suite_id: crate::crypto::CLASSIC_SUITE_ID,
            default_cipher_mode: 1,
        }
    }
}

impl Config {
    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }
}

/// Параметры конструирования `MixCrypto`
///
/// Позволяют продолжить работу с ключами, сохранёнными вне процесса.
/// Пустая строка означает "ключа нет".
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MixCryptoOptions {
    pub cipher_mode: u8,
    pub self_private_key: String,
    pub self_public_key: String,
    pub peer_public_key: String,
}

impl Default for MixCryptoOptions {
    fn default() -> Self {
        Self {
            cipher_mode: Config::global().default_cipher_mode,
            self_private_key: String::new(),
            self_public_key: String::new(),
            peer_public_key: String::new(),
        }
    }
}

impl std::fmt::Debug for MixCryptoOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixCryptoOptions")
            .field("cipher_mode", &self.cipher_mode)
            .field("self_private_key", &if self.self_private_key.is_empty() { "" } else { "<redacted>" })
            .field("self_public_key", &self.self_public_key)
            .field("peer_public_key", &self.peer_public_key)
            .finish()
    }
}

impl MixCryptoOptions {
    /// Создать параметры из переменных окружения
    ///
    /// Незаданные переменные оставляют значения по умолчанию.
    ///
    /// # Errors
    ///
    /// `InvalidArgument`, если `MIXCRYPT_CIPHER_MODE` не является числом
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(val) = std::env::var("MIXCRYPT_CIPHER_MODE") {
            options.cipher_mode = val.trim().parse().map_err(|_| {
                MixCryptoError::InvalidArgument(format!("MIXCRYPT_CIPHER_MODE is not a number: {val}"))
            })?;
        }

        if let Ok(val) = std::env::var("MIXCRYPT_SELF_PRIVATE_KEY") {
            options.self_private_key = val;
        }

        if let Ok(val) = std::env::var("MIXCRYPT_SELF_PUBLIC_KEY") {
            options.self_public_key = val;
        }

        if let Ok(val) = std::env::var("MIXCRYPT_PEER_PUBLIC_KEY") {
            options.peer_public_key = val;
        }

        Ok(options)
    }

    /// Проверенный режим шифрования
    pub fn cipher_mode(&self) -> Result<CipherMode> {
        CipherMode::try_from(self.cipher_mode)
    }
}
