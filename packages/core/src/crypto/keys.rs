// Управление ключами
// Локальная пара ключей + публичный ключ собеседника

use crate::config::MixCryptoOptions;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::random::RandomSource;
use crate::utils::error::{MixCryptoError, Result};
use crate::utils::validation::decode_hex_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Пара ключей в hex-кодировке
///
/// Приватный ключ затирается при drop и не выводится в `Debug`.
/// Сериализация нужна только для явного экспорта по запросу вызывающего кода.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Публичный ключ собеседника (hex)
///
/// Привязки к личности нет: кто прислал ключ, проверяет внешний код.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerPublicKey(String);

impl PeerPublicKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Раскладка asymmetric ciphertext. Должна совпадать у обеих сторон.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherMode {
    /// ephemeral key ‖ ciphertext ‖ tag
    C1C2C3 = 0,
    /// ephemeral key ‖ tag ‖ ciphertext
    #[default]
    C1C3C2 = 1,
}

impl TryFrom<u8> for CipherMode {
    type Error = MixCryptoError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CipherMode::C1C2C3),
            1 => Ok(CipherMode::C1C3C2),
            other => Err(MixCryptoError::InvalidArgument(format!(
                "unsupported cipher mode {other}, expected 0 or 1"
            ))),
        }
    }
}

impl From<CipherMode> for u8 {
    fn from(mode: CipherMode) -> u8 {
        mode as u8
    }
}

/// Явное состояние спаривания ключей
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    /// Нет локальной пары ключей (peer key может быть уже известен)
    Unkeyed,
    /// Есть локальная пара, peer key ещё не получен
    KeyedNoPeer,
    /// Есть и локальная пара, и peer key
    Paired,
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairingState::Unkeyed => "unkeyed",
            PairingState::KeyedNoPeer => "keyed without peer",
            PairingState::Paired => "paired",
        };
        f.write_str(name)
    }
}

/// Хранилище ключей одной пары собеседников
///
/// Один экземпляр = одни отношения с одним peer. Серверу с множеством клиентов
/// нужен отдельный `KeyStore` на каждую сессию.
pub struct KeyStore<P: CryptoProvider> {
    local: Option<KeyPair>,
    peer: Option<PeerPublicKey>,
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> KeyStore<P> {
    /// Пустое хранилище
    pub fn new() -> Self {
        Self {
            local: None,
            peer: None,
            _phantom: PhantomData,
        }
    }

    /// Восстановить из сохранённого ключевого материала
    ///
    /// Если задан только приватный ключ, публичный выводится из него.
    /// Публичный ключ без приватного отклоняется.
    pub fn from_options(options: &MixCryptoOptions) -> Result<Self> {
        let mut store = Self::new();

        match (options.self_private_key.is_empty(), options.self_public_key.is_empty()) {
            (true, true) => {}
            (true, false) => {
                return Err(MixCryptoError::InvalidArgument(
                    "self public key supplied without a private key".to_string(),
                ))
            }
            (false, _) => {
                let private_bytes = Zeroizing::new(decode_hex_key("self private key", &options.self_private_key)?);
                let derived = P::public_key_from_private(&private_bytes)?;

                if !options.self_public_key.is_empty() {
                    let supplied = decode_hex_key("self public key", &options.self_public_key)?;
                    if supplied != derived {
                        return Err(MixCryptoError::InvalidArgument(
                            "self public key does not match self private key".to_string(),
                        ));
                    }
                }

                store.local = Some(KeyPair {
                    public_key: hex::encode(derived),
                    private_key: hex::encode(&*private_bytes),
                });
            }
        }

        if !options.peer_public_key.is_empty() {
            store.accept_peer_key(&options.peer_public_key)?;
        }

        Ok(store)
    }

    pub fn state(&self) -> PairingState {
        match (&self.local, &self.peer) {
            (None, _) => PairingState::Unkeyed,
            (Some(_), None) => PairingState::KeyedNoPeer,
            (Some(_), Some(_)) => PairingState::Paired,
        }
    }

    pub fn local_key_pair(&self) -> Option<&KeyPair> {
        self.local.as_ref()
    }

    pub fn peer_public_key(&self) -> Option<&PeerPublicKey> {
        self.peer.as_ref()
    }

    /// Сгенерировать пару ключей без сохранения (для renewal)
    pub fn stage_key_pair(&self, rng: &mut dyn RandomSource) -> Result<KeyPair> {
        let (private_key, public_key) = P::generate_key_pair(rng)?;
        let private_key = Zeroizing::new(private_key);
        Ok(KeyPair {
            public_key: hex::encode(public_key),
            private_key: hex::encode(&*private_key),
        })
    }

    /// Сгенерировать и сохранить новую локальную пару.
    /// Старый приватный ключ теряется безвозвратно.
    pub fn generate_key_pair(&mut self, rng: &mut dyn RandomSource) -> Result<KeyPair> {
        let key_pair = self.stage_key_pair(rng)?;
        self.local = Some(key_pair.clone());

        info!(
            target: "mixcrypt::keys",
            suite_id = P::suite_id(),
            state = %self.state(),
            "Generated local key pair"
        );
        Ok(key_pair)
    }

    /// Принять публичный ключ собеседника, заменяя прежний
    pub fn accept_peer_key(&mut self, key: &str) -> Result<()> {
        let peer = Self::parse_peer_key(key)?;
        self.peer = Some(peer);

        debug!(target: "mixcrypt::keys", state = %self.state(), "Accepted peer public key");
        Ok(())
    }

    /// Проверить и нормализовать peer key
    pub fn parse_peer_key(key: &str) -> Result<PeerPublicKey> {
        let bytes = decode_hex_key("peer public key", key)?;
        P::validate_public_key(&bytes)
            .map_err(|e| MixCryptoError::InvalidArgument(format!("peer public key rejected: {e}")))?;
        Ok(PeerPublicKey(hex::encode(bytes)))
    }

    /// Очистить все три поля
    pub fn reset(&mut self) {
        self.local = None;
        self.peer = None;
        debug!(target: "mixcrypt::keys", "Key store reset");
    }

    /// Атомарно заменить локальную пару и peer key
    pub fn commit(&mut self, local: KeyPair, peer: PeerPublicKey) {
        self.local = Some(local);
        self.peer = Some(peer);
    }

    /// Приватный ключ в байтах; нужен для decrypt и подписи
    pub fn private_key_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        let local = self.local.as_ref().ok_or_else(|| {
            MixCryptoError::UninitializedKey(format!("local private key is missing (state: {})", self.state()))
        })?;
        Ok(Zeroizing::new(decode_hex_key("self private key", &local.private_key)?))
    }

    /// Публичный ключ собеседника в байтах
    pub fn peer_key_bytes(&self) -> Result<Vec<u8>> {
        let peer = self.peer.as_ref().ok_or_else(|| {
            MixCryptoError::UninitializedKey(format!("peer public key is missing (state: {})", self.state()))
        })?;
        decode_hex_key("peer public key", peer.as_str())
    }
}

impl<P: CryptoProvider> Default for KeyStore<P> {
    fn default() -> Self {
        Self::new()
    }
}
