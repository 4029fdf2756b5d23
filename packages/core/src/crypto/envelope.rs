//! Envelope: подписанный payload внутри симметричного шифротекста
//!
//! ```text
//! {"data": <payload>, "signature": "<hex>"}
//! ```
//!
//! Подпись считается над `digest(canonical_serialize(data))`: компактный JSON
//! с ключами объектов в отсортированном порядке на всех уровнях вложенности.

use crate::crypto::provider::CryptoProvider;
use crate::utils::error::{MixCryptoError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    pub data: Value,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

/// Рекурсивно упорядочить ключи объектов
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

pub fn canonical_serialize(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&canonicalize(value))?)
}

/// Сериализовать envelope в байты для симметричного шифрования
pub fn encode(data: &Value, signature: &[u8]) -> Result<Vec<u8>> {
    let envelope = Envelope {
        data: canonicalize(data),
        signature: signature.to_vec(),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

pub fn decode(bytes: &[u8]) -> Result<Envelope> {
    serde_json::from_slice(bytes).map_err(|e| MixCryptoError::MalformedEnvelope(e.to_string()))
}

/// Подписать digest канонической сериализации payload
pub fn sign_payload<P: CryptoProvider>(private_key: &[u8], data: &Value) -> Result<Vec<u8>> {
    let digest = P::digest(&canonical_serialize(data)?);
    Ok(P::sign(private_key, &digest)?)
}

/// Проверить подпись payload. Любой отказ = `SignatureMismatch`.
pub fn verify_payload<P: CryptoProvider>(public_key: &[u8], data: &Value, signature: &[u8]) -> Result<()> {
    let digest = P::digest(&canonical_serialize(data)?);
    P::verify(public_key, &digest, signature).map_err(|e| {
        debug!(target: "mixcrypt::envelope", error = %e, "Signature verification failed");
        MixCryptoError::SignatureMismatch
    })
}
