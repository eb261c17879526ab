//! rclone-compatible credential obscuring.
//!
//! rclone refuses plaintext passwords in its configuration: credentials are
//! "obscured" with AES-256-CTR under a fixed, well-known key and encoded as
//! unpadded URL-safe base64, with the random IV prepended to the
//! ciphertext. This is reversible encoding, not protection — the key ships
//! inside every rclone binary — but the `RCLONE_CONFIG_*_PASS` variables
//! must carry exactly this format to be accepted.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes256;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use crate::error::{Result, RcloneError};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

// The fixed key rclone uses for config encryption (fs/config/obscure).
const CRYPT_KEY: [u8; 32] = [
    0x9c, 0x93, 0x5b, 0x48, 0x73, 0x0a, 0x55, 0x4d, 0x6b, 0xfd, 0x7c, 0x63, 0xc8, 0x86, 0xa9,
    0x2b, 0xd3, 0x90, 0x19, 0x8e, 0xb8, 0x12, 0x8a, 0xfb, 0xf4, 0xde, 0x16, 0x2b, 0x8b, 0x95,
    0xf6, 0x38,
];

const IV_LEN: usize = 16;

/// Obscure a plaintext credential into rclone's reversible format.
pub fn obscure(plaintext: &str) -> Result<String> {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let mut data = plaintext.as_bytes().to_vec();
    let mut cipher = Aes256Ctr::new(
        GenericArray::from_slice(&CRYPT_KEY),
        GenericArray::from_slice(&iv),
    );
    cipher.apply_keystream(&mut data);

    let mut buf = Vec::with_capacity(IV_LEN + data.len());
    buf.extend_from_slice(&iv);
    buf.extend_from_slice(&data);
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

/// Reveal a credential previously obscured by [`obscure`] or by
/// `rclone obscure` itself.
pub fn reveal(obscured: &str) -> Result<String> {
    let raw = URL_SAFE_NO_PAD
        .decode(obscured)
        .map_err(|e| RcloneError::CredentialEncoding(format!("input is not valid base64: {e}")))?;

    if raw.len() < IV_LEN {
        return Err(RcloneError::CredentialEncoding(
            "input too short to contain an initialization vector".to_string(),
        ));
    }

    let (iv, ciphertext) = raw.split_at(IV_LEN);
    let mut data = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new(
        GenericArray::from_slice(&CRYPT_KEY),
        GenericArray::from_slice(iv),
    );
    cipher.apply_keystream(&mut data);

    String::from_utf8(data).map_err(|_| {
        RcloneError::CredentialEncoding("revealed bytes are not valid UTF-8".to_string())
    })
}
