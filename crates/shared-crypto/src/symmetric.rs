//! # Symmetric Encryption
//!
//! AES-256-CBC as used by the platform's safe mode.
//!
//! ## Format
//!
//! - Key: base64 decode of the 43-character EncodingAESKey (32 bytes)
//! - IV: first 16 bytes of the key
//! - Padding: PKCS#7 with a 32-byte block, not the AES block size

use crate::CryptoError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Key length in bytes.
pub const KEY_SIZE: usize = 32;

/// IV length in bytes.
pub const IV_SIZE: usize = 16;

/// PKCS#7 block size used by the platform.
pub const PKCS7_BLOCK_SIZE: usize = 32;

// Platform keys are random 43-char strings, so the final symbol often
// carries non-zero trailing bits.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Secret key (256-bit).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derive the key from a platform EncodingAESKey.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeyEncoding` if the key is not base64 and
    /// `InvalidKeyLength` if it does not decode to 32 bytes.
    pub fn from_encoding_aes_key(encoding_aes_key: &str) -> Result<Self, CryptoError> {
        let mut decoded = KEY_ENGINE
            .decode(encoding_aes_key)
            .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;

        if decoded.len() != KEY_SIZE {
            let actual = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual,
            });
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(bytes))
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// The IV paired with this key.
    pub fn iv(&self) -> &[u8] {
        &self.0[..IV_SIZE]
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Append PKCS#7 padding for a 32-byte block.
///
/// Always adds between 1 and 32 bytes.
pub fn pkcs7_pad(data: &mut Vec<u8>) {
    let pad = PKCS7_BLOCK_SIZE - (data.len() % PKCS7_BLOCK_SIZE);
    // pad is in 1..=32, fits in a byte
    data.resize(data.len() + pad, pad as u8);
}

/// Strip PKCS#7 padding for a 32-byte block.
///
/// # Errors
///
/// Returns `InvalidPadding` if the trailing bytes are not a valid pad.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8], CryptoError> {
    let pad = *data.last().ok_or(CryptoError::InvalidPadding)? as usize;
    if pad == 0 || pad > PKCS7_BLOCK_SIZE || pad > data.len() {
        return Err(CryptoError::InvalidPadding);
    }

    let (body, padding) = data.split_at(data.len() - pad);
    if padding.iter().any(|&b| b as usize != pad) {
        return Err(CryptoError::InvalidPadding);
    }
    Ok(body)
}

/// Pad and encrypt `plaintext` with AES-256-CBC.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if the cipher cannot be set up.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut buf = plaintext.to_vec();
    pkcs7_pad(&mut buf);

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), key.iv())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(&buf))
}

/// Decrypt AES-256-CBC `ciphertext` and strip padding.
///
/// # Errors
///
/// - `DecryptionFailed` if the ciphertext is not block aligned
/// - `InvalidPadding` if the decrypted padding is malformed
pub fn decrypt(key: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() {
        return Err(CryptoError::DecryptionFailed("empty ciphertext".into()));
    }

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), key.iv())
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("ciphertext is not block aligned".into()))?;

    pkcs7_unpad(&plaintext).map(<[u8]>::to_vec)
}
