use log::info;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::crypto::{self, KdfParams};
use super::envelope;

/// Saves and loads a whole `Portfolio` as an encrypted envelope.
///
/// Flow: Portfolio → bincode → AES-256-GCM(Argon2id(password)) → PVLT bytes
#[derive(Debug, Clone, Default)]
pub struct StorageManager {
    kdf: KdfParams,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom Argon2id costs for newly sealed files. Loading always
    /// uses the costs stored in the file.
    pub fn with_kdf(kdf: KdfParams) -> Result<Self, CoreError> {
        kdf.validate()?;
        Ok(Self { kdf })
    }

    pub fn save_to_bytes(&self, portfolio: &Portfolio, password: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))?;
        let sealed = crypto::seal(&plaintext, password, self.kdf)?;
        Ok(envelope::encode(&sealed))
    }

    pub fn load_from_bytes(&self, data: &[u8], password: &str) -> Result<Portfolio, CoreError> {
        let sealed = envelope::decode(data)?;
        let plaintext = crypto::open(&sealed, password)?;
        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize portfolio: {e}")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(
        &self,
        portfolio: &Portfolio,
        path: impl AsRef<std::path::Path>,
        password: &str,
    ) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = self.save_to_bytes(portfolio, password)?;
        std::fs::write(path, &bytes)?;
        info!("Saved portfolio ({} bytes) to {}", bytes.len(), path.display());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(
        &self,
        path: impl AsRef<std::path::Path>,
        password: &str,
    ) -> Result<Portfolio, CoreError> {
        let path = path.as_ref();
        let portfolio = self.load_from_bytes(&std::fs::read(path)?, password)?;
        info!(
            "Loaded portfolio from {}: {} purchases, {} prices",
            path.display(),
            portfolio.ledger.len(),
            portfolio.prices.total_entries()
        );
        Ok(portfolio)
    }
}
