// Password envelope: AES-256-EAX keyed by SHA-256(password).
// Envelope layout: nonce (16) + tag (16) + ciphertext (same length as plaintext).

use aead::generic_array::GenericArray;
use aead::{AeadInPlace, KeyInit};
use aes::Aes256;
use eax::Eax;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{Error, Result};

pub const NONCE_LEN: usize = 16;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
/// Bytes an envelope adds on top of its plaintext.
pub const ENVELOPE_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

type Aes256Eax = Eax<Aes256>;

/// 32-byte cipher key, wiped when dropped.
pub type Key = Zeroizing<[u8; KEY_LEN]>;

/// Derive the cipher key from a password: one SHA-256 pass over its UTF-8 bytes, no salt.
pub fn derive_key(password: &str) -> Key {
    Zeroizing::new(Sha256::digest(password.as_bytes()).into())
}

fn cipher_for(password: &str) -> Aes256Eax {
    let key = derive_key(password);
    Aes256Eax::new(GenericArray::from_slice(&key[..]))
}

/// Encrypt plaintext under a password. Returns binary: nonce + tag + ciphertext.
///
/// Every call draws a fresh nonce from the thread-local CSPRNG.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let cipher = cipher_for(password);
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| Error::Encryption)?;

    let mut out = Vec::with_capacity(ENVELOPE_OVERHEAD + buffer.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&tag);
    out.extend_from_slice(&buffer);
    Ok(out)
}

/// Verify and decrypt an envelope produced by [`encrypt`].
///
/// Fails with [`Error::MalformedEnvelope`] below 32 bytes and with
/// [`Error::Integrity`] when the tag does not match. No plaintext is
/// returned unless the tag verifies.
pub fn decrypt(envelope: &[u8], password: &str) -> Result<Vec<u8>> {
    if envelope.len() < ENVELOPE_OVERHEAD {
        return Err(Error::MalformedEnvelope {
            actual: envelope.len(),
            minimum: ENVELOPE_OVERHEAD,
        });
    }
    let (nonce, rest) = envelope.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let cipher = cipher_for(password);
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| Error::Integrity)?;
    Ok(buffer)
}
