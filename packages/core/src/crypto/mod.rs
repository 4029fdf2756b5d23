//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │        (transport: HTTP, WebSocket - вне этого крейта)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  MixCrypto (High-Level API)                 │
//! │  - encrypt / decrypt                                        │
//! │  - generate / accept / reset / renew                        │
//! │  - один экземпляр = одна пара собеседников                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │    KeyStore     │ │    Envelope     │ │  RandomSource   │
//! │ - local pair    │ │ - codec         │ │ - injected      │
//! │ - peer key      │ │ - sign/verify   │ │ - SystemRandom  │
//! │ - PairingState  │ │ - canonical JSON│ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (Crypto-Agility)                │
//! │  - Key wrapping (X25519 ECIES)                              │
//! │  - Signatures (Ed25519 над SHA-256)                         │
//! │  - Bulk cipher (AES-128-GCM)                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! - [`provider`]: CryptoProvider trait для crypto-agility
//! - [`suites`]: Реализации CryptoProvider (Classic)
//! - [`random`]: RandomSource и выбор системного источника
//! - [`keys`]: KeyStore, KeyPair, CipherMode, PairingState
//! - [`envelope`]: подписанный payload внутри шифротекста
//! - [`mix_cipher`]: MixCrypto - high-level API

// ============================================================================
// Core Traits
// ============================================================================

/// CryptoProvider trait для crypto-agility
pub mod provider;

/// Источник случайности
pub mod random;

// ============================================================================
// Implementations
// ============================================================================

/// Криптографические наборы
pub mod suites;

// ============================================================================
// Protocol
// ============================================================================

pub mod keys;

pub mod envelope;

/// High-level API
pub mod mix_cipher;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use provider::CryptoProvider;

pub type SuiteID = u16;

/// Suite ID for the classic suite
pub const CLASSIC_SUITE_ID: SuiteID = 1;
