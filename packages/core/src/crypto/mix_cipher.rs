//! MixCrypto - гибридное шифрование одной пары собеседников
//!
//! Объединяет KeyStore, Envelope и CryptoProvider в единый API.
//!
//! ## Encrypt
//!
//! ```text
//! payload ──sign(digest(canonical(payload)), self_private)──► Envelope{data, signature}
//! Envelope ──AES-128-GCM(K_sym)──────────────────────────────► cipher_text
//! K_sym ─────wrap(peer_public, cipher_mode)──────────────────► wrapped_key
//! ```
//!
//! `K_sym` - свежие 16 байт (32 hex-символа) на каждый вызов, никогда не
//! переиспользуется. Оборачивается ключом **собеседника**: развернуть его может
//! только владелец peer private key.
//!
//! ## Decrypt
//!
//! Обратная цепочка плюс проверка подписи ключом собеседника. Без проверки
//! (`Verification::Unverified`) можно принять только самое первое сообщение,
//! когда peer key ещё неизвестен.
//!
//! ## Renewal
//!
//! ```text
//! A                                             B
//! stage new pair (не сохраняется)
//! encrypt({publicKey: A_new}) старыми ключами ──►
//!                                               decrypt + verify старыми ключами
//!                                               generate B_new, accept A_new
//!                       ◄────────────────────── B_new
//! commit (A_new, B_new)
//! ```
//!
//! Один экземпляр = одни отношения. Сервер с множеством клиентов создаёт
//! отдельный `MixCrypto` на каждую сессию.

use crate::config::{Config, MixCryptoOptions};
use crate::crypto::envelope;
use crate::crypto::keys::{CipherMode, KeyPair, KeyStore, PairingState};
use crate::crypto::provider::CryptoProvider;
use crate::crypto::random::{self, RandomSource, SystemRandom};
use crate::crypto::suites::classic::ClassicSuiteProvider;
use crate::utils::error::{MixCryptoError, Result};
use crate::utils::validation::validate_payload;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Результат одного encrypt: два независимо передаваемых артефакта (hex)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixEncryptResult {
    pub cipher_text: String,
    pub wrapped_key: String,
}

/// Проверять ли подпись при decrypt. Выбирается явно на каждом вызове.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Подпись проверяется ключом собеседника
    Verified,
    /// Подпись не проверяется. Только для первого входящего сообщения.
    Unverified,
}

/// Payload запроса на смену ключей
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RenewalRequest {
    pub public_key: String,
}

/// Гибридный шифр + жизненный цикл ключей одной пары собеседников
///
/// ## Generics
///
/// - `P`: CryptoProvider - криптографический suite
pub struct MixCrypto<P: CryptoProvider = ClassicSuiteProvider> {
    keys: KeyStore<P>,
    cipher_mode: CipherMode,
    rng: Box<dyn RandomSource>,
}

impl<P: CryptoProvider> MixCrypto<P> {
    /// Пустой экземпляр с режимом по умолчанию и системным источником случайности
    pub fn new() -> Result<Self> {
        Self::from_options(&MixCryptoOptions::default())
    }

    /// Восстановить из сохранённого ключевого материала
    pub fn from_options(options: &MixCryptoOptions) -> Result<Self> {
        Self::with_random_source(options, Box::new(SystemRandom::resolve()?))
    }

    /// Как `from_options`, но с внешним источником случайности
    pub fn with_random_source(options: &MixCryptoOptions, rng: Box<dyn RandomSource>) -> Result<Self> {
        let cipher_mode = options.cipher_mode()?;
        let keys = KeyStore::from_options(options)?;

        debug!(
            target: "mixcrypt::cipher",
            cipher_mode = u8::from(cipher_mode),
            suite_id = P::suite_id(),
            state = %keys.state(),
            "MixCrypto created"
        );

        Ok(Self { keys, cipher_mode, rng })
    }

    pub fn cipher_mode(&self) -> CipherMode {
        self.cipher_mode
    }

    pub fn state(&self) -> PairingState {
        self.keys.state()
    }

    pub fn key_store(&self) -> &KeyStore<P> {
        &self.keys
    }

    /// Локальный публичный ключ, если он есть
    pub fn public_key(&self) -> Option<&str> {
        self.keys.local_key_pair().map(|pair| pair.public_key.as_str())
    }

    // === Жизненный цикл ключей ===

    pub fn generate_key_pair(&mut self) -> Result<KeyPair> {
        self.keys.generate_key_pair(self.rng.as_mut())
    }

    pub fn accept_peer_key(&mut self, key: &str) -> Result<()> {
        self.keys.accept_peer_key(key)
    }

    pub fn reset_key_pair(&mut self) {
        self.keys.reset();
    }

    /// `length` случайных hex-символов из внедрённого источника
    pub fn random_hex(&mut self, length: usize) -> Result<String> {
        random::random_hex(self.rng.as_mut(), length)
    }

    // === Шифрование ===

    /// Зашифровать и подписать структурированный payload для собеседника
    ///
    /// # Ошибки
    ///
    /// - `UninitializedKey`: нет локальной пары или peer key
    /// - `InvalidPayload`: payload не объект и не массив
    pub fn encrypt(&mut self, payload: &Value) -> Result<MixEncryptResult> {
        if self.keys.state() != PairingState::Paired {
            return Err(MixCryptoError::UninitializedKey(format!(
                "encrypt requires a local key pair and a peer public key (state: {})",
                self.keys.state()
            )));
        }
        validate_payload(payload)?;

        let private_key = self.keys.private_key_bytes()?;
        let peer_key = self.keys.peer_key_bytes()?;

        let symmetric_key_hex = Zeroizing::new(random::random_hex(
            self.rng.as_mut(),
            Config::global().symmetric_key_hex_length,
        )?);
        let symmetric_key = Zeroizing::new(
            hex::decode(symmetric_key_hex.as_str())
                .map_err(|e| MixCryptoError::InvalidArgument(format!("symmetric key: {e}")))?,
        );

        let signature = envelope::sign_payload::<P>(&private_key, payload)?;
        let plain = Zeroizing::new(envelope::encode(payload, &signature)?);
        let cipher_text = P::symmetric_encrypt(&symmetric_key, &plain, self.rng.as_mut())?;

        let wrapped_key = P::asymmetric_encrypt(
            &peer_key,
            symmetric_key_hex.as_bytes(),
            self.cipher_mode,
            self.rng.as_mut(),
        )?;

        debug!(
            target: "mixcrypt::cipher",
            envelope_len = plain.len(),
            cipher_text_len = cipher_text.len(),
            cipher_mode = u8::from(self.cipher_mode),
            "Payload encrypted"
        );

        Ok(MixEncryptResult {
            cipher_text: hex::encode(cipher_text),
            wrapped_key: hex::encode(wrapped_key),
        })
    }

    /// Сериализовать произвольный тип в JSON и зашифровать
    pub fn encrypt_serializable<T: Serialize + ?Sized>(&mut self, payload: &T) -> Result<MixEncryptResult> {
        let value = serde_json::to_value(payload)?;
        self.encrypt(&value)
    }

    /// Расшифровать и (опционально) проверить подпись
    ///
    /// Пустой `cipher_text` даёт `Value::Null` без вызова симметричного шифра.
    /// Проверки ключей (включая peer key при `Verified`) и unwrap ключа выполняются и в этом случае.
    ///
    /// # Ошибки
    ///
    /// - `UninitializedKey`: нет локального приватного ключа, либо `Verified` без peer key
    /// - `MalformedEnvelope`: расшифрованные байты не являются envelope
    /// - `SignatureMismatch`: подпись не сошлась
    /// - `Crypto`: шифротекст или wrapped key повреждены
    pub fn decrypt(&self, cipher_text: &str, wrapped_key: &str, verification: Verification) -> Result<Value> {
        let private_key = self.keys.private_key_bytes()?;
        let peer_key = match verification {
            Verification::Verified => Some(self.keys.peer_key_bytes()?),
            Verification::Unverified => {
                warn!(target: "mixcrypt::cipher", state = %self.keys.state(), "Decrypting without signature verification");
                None
            }
        };

        let wrapped = hex::decode(wrapped_key.trim())
            .map_err(|e| MixCryptoError::InvalidArgument(format!("wrapped key is not valid hex: {e}")))?;
        let unwrapped = Zeroizing::new(P::asymmetric_decrypt(&private_key, &wrapped, self.cipher_mode)?);
        let symmetric_key = Zeroizing::new(self.parse_symmetric_key(&unwrapped)?);

        if cipher_text.is_empty() {
            return Ok(Value::Null);
        }

        let cipher_bytes = hex::decode(cipher_text.trim())
            .map_err(|e| MixCryptoError::InvalidArgument(format!("cipher text is not valid hex: {e}")))?;
        let plain = Zeroizing::new(P::symmetric_decrypt(&symmetric_key, &cipher_bytes)?);
        let envelope::Envelope { data, signature } = envelope::decode(&plain)?;

        if let Some(peer_key) = peer_key {
            envelope::verify_payload::<P>(&peer_key, &data, &signature)?;
        }

        debug!(
            target: "mixcrypt::cipher",
            envelope_len = plain.len(),
            verified = verification == Verification::Verified,
            "Payload decrypted"
        );
        Ok(data)
    }

    /// Расшифровать и десериализовать в конкретный тип
    pub fn decrypt_as<T: DeserializeOwned>(
        &self,
        cipher_text: &str,
        wrapped_key: &str,
        verification: Verification,
    ) -> Result<T> {
        let value = self.decrypt(cipher_text, wrapped_key, verification)?;
        Ok(serde_json::from_value(value)?)
    }

    fn parse_symmetric_key(&self, unwrapped: &[u8]) -> Result<Vec<u8>> {
        let expected = Config::global().symmetric_key_hex_length;
        if unwrapped.len() != expected {
            return Err(MixCryptoError::MalformedEnvelope(format!(
                "wrapped key carries {} bytes, expected {}",
                unwrapped.len(),
                expected
            )));
        }
        hex::decode(unwrapped)
            .map_err(|e| MixCryptoError::MalformedEnvelope(format!("wrapped key is not a hex symmetric key: {e}")))
    }

    // === Renewal ===

    /// Сменить пару ключей обеих сторон
    ///
    /// Новая пара генерируется, но не сохраняется, пока `exchange` не вернёт
    /// новый публичный ключ собеседника. Запрос подписан и зашифрован **текущими**
    /// ключами. При ошибке `exchange` состояние остаётся прежним, а ошибка
    /// возвращается без изменений в `MixCryptoError::Exchange`.
    ///
    /// `&mut self` исключает параллельный renewal на одном экземпляре.
    /// Таймаута нет: оберните `exchange`, если он нужен.
    pub async fn renew_key_pair<F, Fut>(&mut self, exchange: F) -> Result<()>
    where
        F: FnOnce(MixEncryptResult) -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        let staged = self.keys.stage_key_pair(self.rng.as_mut())?;
        let request = RenewalRequest {
            public_key: staged.public_key.clone(),
        };
        let outgoing = self.encrypt_serializable(&request)?;

        info!(target: "mixcrypt::renewal", "Sending key renewal request");

        let peer_key = exchange(outgoing).await?;
        let peer = KeyStore::<P>::parse_peer_key(&peer_key)?;
        self.keys.commit(staged, peer);

        info!(target: "mixcrypt::renewal", state = %self.keys.state(), "Key renewal committed");
        Ok(())
    }

    /// Ответная сторона renewal
    ///
    /// Проверяет запрос текущими ключами, генерирует свою новую пару, принимает
    /// новый ключ инициатора и возвращает свой новый публичный ключ для передачи
    /// обратно. При любой ошибке состояние не меняется.
    pub fn respond_to_renewal(&mut self, request: &MixEncryptResult) -> Result<String> {
        let renewal: RenewalRequest = self
            .decrypt_as(&request.cipher_text, &request.wrapped_key, Verification::Verified)
            .map_err(|e| match e {
                MixCryptoError::SerializationError(msg) => {
                    MixCryptoError::MalformedEnvelope(format!("not a renewal request: {msg}"))
                }
                other => other,
            })?;

        let peer = KeyStore::<P>::parse_peer_key(&renewal.public_key)?;
        let staged = self.keys.stage_key_pair(self.rng.as_mut())?;
        let public_key = staged.public_key.clone();
        self.keys.commit(staged, peer);

        info!(target: "mixcrypt::renewal", "Answered key renewal request");
        Ok(public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paired() -> (MixCrypto, MixCrypto) {
        let mut alice = MixCrypto::<ClassicSuiteProvider>::new().unwrap();
        let mut bob = MixCrypto::<ClassicSuiteProvider>::new().unwrap();
        let alice_keys = alice.generate_key_pair().unwrap();
        let bob_keys = bob.generate_key_pair().unwrap();
        alice.accept_peer_key(&bob_keys.public_key).unwrap();
        bob.accept_peer_key(&alice_keys.public_key).unwrap();
        (alice, bob)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let (mut alice, bob) = paired();
        let payload = json!({"name": "x", "age": 1});

        let result = alice.encrypt(&payload).unwrap();
        let decrypted = bob.decrypt(&result.cipher_text, &result.wrapped_key, Verification::Verified).unwrap();
        assert_eq!(decrypted, payload);
    }

    #[test]
    fn test_wrapped_key_targets_peer() {
        let (mut alice, _bob) = paired();
        let result = alice.encrypt(&json!({"a": 1})).unwrap();

        // Свой же приватный ключ не разворачивает K_sym
        let err = alice.decrypt(&result.cipher_text, &result.wrapped_key, Verification::Unverified);
        assert!(matches!(err, Err(MixCryptoError::Crypto(_))));
    }

    #[test]
    fn test_symmetric_key_length() {
        let mut crypto = MixCrypto::<ClassicSuiteProvider>::new().unwrap();
        let key = crypto.random_hex(Config::global().symmetric_key_hex_length).unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(crypto.parse_symmetric_key(key.as_bytes()).unwrap().len(), 16);
        assert!(matches!(
            crypto.parse_symmetric_key(b"abcd"),
            Err(MixCryptoError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_invalid_cipher_mode_option() {
        let options = MixCryptoOptions { cipher_mode: 3, ..Default::default() };
        assert!(matches!(
            MixCrypto::<ClassicSuiteProvider>::from_options(&options),
            Err(MixCryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_respond_to_renewal_rejects_other_payloads() {
        let (mut alice, mut bob) = paired();
        let before = bob.key_store().local_key_pair().cloned();

        let result = alice.encrypt(&json!({"name": "x"})).unwrap();
        let err = bob.respond_to_renewal(&result);
        assert!(matches!(err, Err(MixCryptoError::MalformedEnvelope(_))));
        assert_eq!(bob.key_store().local_key_pair().cloned(), before);
    }
}
