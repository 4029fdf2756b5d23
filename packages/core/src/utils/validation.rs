use crate::utils::error::{MixCryptoError, Result};
use serde_json::Value;

/// Шифровать можно только объект или массив
pub fn validate_payload(payload: &Value) -> Result<()> {
    match payload {
        Value::Object(_) | Value::Array(_) => Ok(()),
        Value::Null => Err(MixCryptoError::InvalidPayload("payload is null".to_string())),
        other => Err(MixCryptoError::InvalidPayload(format!(
            "payload must be an object or array, got {}",
            value_kind(other)
        ))),
    }
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Декодировать hex-ключ, `what` попадает в текст ошибки
pub fn decode_hex_key(what: &str, key: &str) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(MixCryptoError::InvalidArgument(format!("{what} is empty")));
    }
    hex::decode(key.trim()).map_err(|e| MixCryptoError::InvalidArgument(format!("{what} is not valid hex: {e}")))
}
