//! Field encryption and password hashing for stored card data.
//!
//! Two AES-256-CBC payload layouts are in use:
//!
//! - [`encrypt`] generates a fresh random key per value and emits
//!   `base64(key || iv || ciphertext)`. The key travels inside the payload,
//!   so anyone holding the payload can decrypt it. Card numbers and
//!   cardholder names are stored this way.
//! - [`encrypt_field`] uses the fixed [`FIELD_KEY`] with a fresh IV and
//!   emits `base64(iv || ciphertext)`. Expiration month, year and CVV are
//!   stored this way.
//!
//! Passwords are hashed with a single unsalted SHA-256 pass
//! ([`hash_password`]), so equal passwords produce equal hashes.

use aes::Aes256;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Fixed key for expiration month, year and CVV payloads.
const FIELD_KEY: &[u8; KEY_LEN] = b"vq3Lr0xPb8sKandW51uJmzHcyT6geCfA";

/// Errors from decrypting a stored payload.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("payload too short")]
    Truncated,

    #[error("invalid padding")]
    Padding,

    #[error("decrypted value is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Hash a password with unsalted SHA-256, base64-encoded.
#[must_use]
pub fn hash_password(password: &str) -> String {
    BASE64.encode(Sha256::digest(password.as_bytes()))
}

/// Encrypt a value under a fresh random key, emitting
/// `base64(key || iv || ciphertext)`.
#[must_use]
pub fn encrypt(plaintext: &str) -> String {
    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    let mut rng = rand::rng();
    rng.fill_bytes(&mut key);
    rng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut payload = Vec::with_capacity(KEY_LEN + IV_LEN + ciphertext.len());
    payload.extend_from_slice(&key);
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);
    BASE64.encode(payload)
}

/// Decrypt a `base64(key || iv || ciphertext)` payload.
///
/// # Errors
///
/// Returns `CryptoError` if the payload is malformed.
pub fn decrypt(payload: &str) -> Result<String, CryptoError> {
    let raw = BASE64.decode(payload)?;
    if raw.len() < KEY_LEN + IV_LEN {
        return Err(CryptoError::Truncated);
    }
    let (key, rest) = raw.split_at(KEY_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let key: [u8; KEY_LEN] = key.try_into().map_err(|_| CryptoError::Truncated)?;
    let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| CryptoError::Truncated)?;

    let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Padding)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Encrypt a value under [`FIELD_KEY`], emitting `base64(iv || ciphertext)`.
#[must_use]
pub fn encrypt_field(plaintext: &str) -> String {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(FIELD_KEY.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut payload = Vec::with_capacity(IV_LEN + ciphertext.len());
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);
    BASE64.encode(payload)
}

/// Decrypt a `base64(iv || ciphertext)` payload under [`FIELD_KEY`].
///
/// # Errors
///
/// Returns `CryptoError` if the payload is malformed.
pub fn decrypt_field(payload: &str) -> Result<String, CryptoError> {
    let raw = BASE64.decode(payload)?;
    if raw.len() < IV_LEN {
        return Err(CryptoError::Truncated);
    }
    let (iv, ciphertext) = raw.split_at(IV_LEN);
    let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| CryptoError::Truncated)?;

    let plaintext = Aes256CbcDec::new(FIELD_KEY.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Padding)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Encrypt an expiration month.
#[must_use]
pub fn encrypt_month(month: &str) -> String {
    encrypt_field(month)
}

/// Decrypt an expiration month, truncated to two characters.
///
/// # Errors
///
/// Returns `CryptoError` if the payload is malformed.
pub fn decrypt_month(payload: &str) -> Result<String, CryptoError> {
    Ok(decrypt_field(payload)?.chars().take(2).collect())
}

/// Encrypt an expiration year.
#[must_use]
pub fn encrypt_year(year: &str) -> String {
    encrypt_field(year)
}

/// Decrypt an expiration year, truncated to two characters.
///
/// # Errors
///
/// Returns `CryptoError` if the payload is malformed.
pub fn decrypt_year(payload: &str) -> Result<String, CryptoError> {
    Ok(decrypt_field(payload)?.chars().take(2).collect())
}

/// Encrypt a CVV.
#[must_use]
pub fn encrypt_cvv(cvv: &str) -> String {
    encrypt_field(cvv)
}

/// Decrypt a CVV. Unlike month and year, the full value is returned.
///
/// # Errors
///
/// Returns `CryptoError` if the payload is malformed.
pub fn decrypt_cvv(payload: &str) -> Result<String, CryptoError> {
    decrypt_field(payload)
}
