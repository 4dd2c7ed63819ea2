//! Plaintext framing inside the encrypted envelope.
//!
//! ```text
//! random (16 bytes) | message length (u32, big-endian) | message | app id
//! ```

use crate::domain::errors::EnvelopeError;

/// Length of the random prefix.
pub const RANDOM_PREFIX_LEN: usize = 16;

const LENGTH_FIELD_LEN: usize = 4;
const HEADER_LEN: usize = RANDOM_PREFIX_LEN + LENGTH_FIELD_LEN;

/// Build a frame around `message`.
///
/// # Errors
///
/// Returns `EnvelopeError::Encryption` if the message does not fit the
/// 32-bit length field.
pub fn seal(
    message: &[u8],
    app_id: &str,
    random: [u8; RANDOM_PREFIX_LEN],
) -> Result<Vec<u8>, EnvelopeError> {
    let len = u32::try_from(message.len())
        .map_err(|_| EnvelopeError::Encryption("message too large to frame".into()))?;

    let mut frame = Vec::with_capacity(HEADER_LEN + message.len() + app_id.len());
    frame.extend_from_slice(&random);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(message);
    frame.extend_from_slice(app_id.as_bytes());
    Ok(frame)
}

/// Split a decrypted frame into `(message, app_id)` bytes.
///
/// # Errors
///
/// Returns `EnvelopeError::Decryption` if the frame is shorter than its
/// declared message length.
pub fn open(plaintext: &[u8]) -> Result<(&[u8], &[u8]), EnvelopeError> {
    if plaintext.len() < HEADER_LEN {
        return Err(EnvelopeError::Decryption(format!(
            "frame too short: {} bytes",
            plaintext.len()
        )));
    }

    let mut len_bytes = [0u8; LENGTH_FIELD_LEN];
    len_bytes.copy_from_slice(&plaintext[RANDOM_PREFIX_LEN..HEADER_LEN]);
    let len = u32::from_be_bytes(len_bytes) as usize;

    let rest = &plaintext[HEADER_LEN..];
    if len > rest.len() {
        return Err(EnvelopeError::Decryption(format!(
            "declared message length {} exceeds frame ({} bytes)",
            len,
            rest.len()
        )));
    }

    Ok(rest.split_at(len))
}
