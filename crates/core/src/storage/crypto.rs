use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters, written into every envelope so a file can be
/// reopened with the exact settings it was sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
}

impl KdfParams {
    /// Accepted bounds when reading a header; a crafted file must not be
    /// able to demand gigabytes of memory.
    pub const MEMORY_COST_RANGE: std::ops::RangeInclusive<u32> = 8..=1_048_576;
    pub const TIME_COST_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
    pub const PARALLELISM_RANGE: std::ops::RangeInclusive<u32> = 1..=16;

    /// Cheapest parameters Argon2 accepts. Only for tests and throwaway data.
    pub fn minimal() -> Self {
        Self {
            memory_cost: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("memory_cost", self.memory_cost, &Self::MEMORY_COST_RANGE)?;
        check_range("time_cost", self.time_cost, &Self::TIME_COST_RANGE)?;
        check_range("parallelism", self.parallelism, &Self::PARALLELISM_RANGE)
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

fn check_range(
    name: &str,
    value: u32,
    range: &std::ops::RangeInclusive<u32>,
) -> Result<(), CoreError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidFileFormat(format!(
            "KDF {name} out of range: {value} (expected {}..={})",
            range.start(),
            range.end()
        )))
    }
}

/// Ciphertext plus the random material needed to open it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub kdf: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// AES-256-GCM output, auth tag appended
    pub ciphertext: Vec<u8>,
}

/// Derive an AES-256 key from a password with Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    kdf: &KdfParams,
) -> Result<[u8; KEY_LEN], CoreError> {
    let params = Params::new(kdf.memory_cost, kdf.time_cost, kdf.parallelism, Some(KEY_LEN))
        .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
    Ok(key)
}

/// Encrypt `plaintext` under a fresh salt and nonce.
pub fn seal(plaintext: &[u8], password: &str, kdf: KdfParams) -> Result<Sealed, CoreError> {
    let salt: [u8; SALT_LEN] = random_bytes()?;
    let nonce: [u8; NONCE_LEN] = random_bytes()?;
    let key = derive_key(password, &salt, &kdf)?;

    let ciphertext = cipher(&key)?
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;

    Ok(Sealed {
        kdf,
        salt,
        nonce,
        ciphertext,
    })
}

/// Decrypt a sealed payload. A wrong password and a tampered ciphertext
/// both surface as `CoreError::Decryption`.
pub fn open(sealed: &Sealed, password: &str) -> Result<Vec<u8>, CoreError> {
    let key = derive_key(password, &sealed.salt, &sealed.kdf)?;
    let plaintext = cipher(&key)?.decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())?;
    Ok(plaintext)
}

fn cipher(key: &[u8; KEY_LEN]) -> Result<Aes256Gcm, CoreError> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))
}

fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to gather randomness: {e}")))?;
    Ok(buf)
}
