// Типы ошибок протокола

use crate::error::CryptoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MixCryptoError {
    /// Локальный или peer ключ отсутствует для запрошенной операции
    #[error("Uninitialized key: {0}")]
    UninitializedKey(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// null или скаляр вместо объекта/массива
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Подпись не сошлась: подмена данных или путаница ключей
    #[error("Signature mismatch: payload was not signed by the paired peer")]
    SignatureMismatch,

    #[error("No secure random source available")]
    NoSecureRandomSource,

    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Ошибка внешнего transport callback при renewal, без изменений
    #[error("Key exchange failed: {0}")]
    Exchange(#[from] anyhow::Error),
}

impl From<serde_json::Error> for MixCryptoError {
    fn from(error: serde_json::Error) -> Self {
        MixCryptoError::SerializationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MixCryptoError>;
