use crate::errors::CoreError;
use super::crypto::{KdfParams, Sealed, NONCE_LEN, SALT_LEN};

/// Magic bytes opening every persisted portfolio.
pub const MAGIC: &[u8; 4] = b"PVLT";

/// Envelope version written by this build.
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + ciphertext_len(8)
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Serialize a sealed payload.
///
/// ```text
/// [PVLT] [version u16] [memory_cost u32] [time_cost u32] [parallelism u32]
/// [salt 16B] [nonce 12B] [ciphertext_len u64] [ciphertext]
/// ```
/// Integers are little-endian.
pub fn encode(sealed: &Sealed) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + sealed.ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf.memory_cost.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf.time_cost.to_le_bytes());
    buf.extend_from_slice(&sealed.kdf.parallelism.to_le_bytes());
    buf.extend_from_slice(&sealed.salt);
    buf.extend_from_slice(&sealed.nonce);
    buf.extend_from_slice(&(sealed.ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(&sealed.ciphertext);
    buf
}

/// Parse an envelope back into its sealed payload. Trailing bytes after
/// the declared ciphertext are ignored.
pub fn decode(data: &[u8]) -> Result<Sealed, CoreError> {
    if data.len() < HEADER_LEN {
        return Err(CoreError::InvalidFileFormat(format!(
            "Envelope too short: {} bytes, header needs {HEADER_LEN}",
            data.len()
        )));
    }

    let mut reader = Reader { data, pos: 0 };

    if reader.take::<4>()? != *MAGIC {
        return Err(CoreError::InvalidFileFormat("Missing PVLT magic bytes".into()));
    }

    let version = u16::from_le_bytes(reader.take()?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf = KdfParams {
        memory_cost: u32::from_le_bytes(reader.take()?),
        time_cost: u32::from_le_bytes(reader.take()?),
        parallelism: u32::from_le_bytes(reader.take()?),
    };
    kdf.validate()?;

    let salt = reader.take::<SALT_LEN>()?;
    let nonce = reader.take::<NONCE_LEN>()?;
    let declared = u64::from_le_bytes(reader.take()?);

    let ciphertext = usize::try_from(declared)
        .ok()
        .and_then(|len| reader.rest().get(..len))
        .ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "Envelope truncated: {declared} ciphertext bytes declared, {} present",
                reader.rest().len()
            ))
        })?
        .to_vec();

    Ok(Sealed {
        kdf,
        salt,
        nonce,
        ciphertext,
    })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let bytes: [u8; N] = self
            .data
            .get(self.pos..self.pos + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat(format!("Header field at byte {} cut short", self.pos)))?;
        self.pos += N;
        Ok(bytes)
    }

    fn rest(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}
