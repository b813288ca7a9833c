//! Response Cipher - AES-256-CBC 响应加密
//!
//! 与前端 CryptoJS 解密逻辑保持一致：
//! - 明文为 JSON 序列化后的 UTF-8 字节
//! - AES-256-CBC + PKCS#7 填充
//! - 密文与 IV 均为小写十六进制
//! - 密钥由口令派生（PBKDF2-HMAC-SHA512 或 SHA-256）

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// PBKDF2 固定盐（与前端一致）
pub const PBKDF2_SALT: &[u8] = b"logshare-salt";

/// PBKDF2 迭代次数（与前端一致）
pub const PBKDF2_ROUNDS: u32 = 10_000;

const IV_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid key or IV length")]
    InvalidLength,

    #[error("Decryption failed: bad padding or wrong key")]
    BadPadding,
}

/// 密钥派生方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyDerivation {
    /// PBKDF2-HMAC-SHA512(key, "logshare-salt", 10000) -> 32 bytes
    #[default]
    Pbkdf2,
    /// SHA-256(key)
    Sha256,
}

impl KeyDerivation {
    pub fn derive(&self, secret: &str) -> [u8; 32] {
        match self {
            KeyDerivation::Pbkdf2 => {
                let mut key = [0u8; 32];
                pbkdf2::pbkdf2_hmac::<Sha512>(
                    secret.as_bytes(),
                    PBKDF2_SALT,
                    PBKDF2_ROUNDS,
                    &mut key,
                );
                key
            }
            KeyDerivation::Sha256 => Sha256::digest(secret.as_bytes()).into(),
        }
    }
}

/// 加密后的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub data: String,
    pub iv: String,
}

/// 序列化并加密任意值
pub fn encrypt_payload<T: Serialize>(
    value: &T,
    secret: &str,
    derivation: KeyDerivation,
) -> Result<EncryptedPayload, CipherError> {
    let plaintext =
        serde_json::to_vec(value).map_err(|e| CipherError::Serialization(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let key = derivation.derive(secret);
    let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|_| CipherError::InvalidLength)?
        .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

    tracing::debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        kdf = ?derivation,
        "Payload encrypted"
    );

    Ok(EncryptedPayload {
        data: hex::encode(ciphertext),
        iv: hex::encode(iv),
    })
}

/// 解密并反序列化
pub fn decrypt_payload<T: DeserializeOwned>(
    payload: &EncryptedPayload,
    secret: &str,
    derivation: KeyDerivation,
) -> Result<T, CipherError> {
    let ciphertext =
        hex::decode(&payload.data).map_err(|e| CipherError::InvalidHex(e.to_string()))?;
    let iv = hex::decode(&payload.iv).map_err(|e| CipherError::InvalidHex(e.to_string()))?;
    if iv.len() != IV_LEN {
        return Err(CipherError::InvalidLength);
    }

    let key = derivation.derive(secret);
    let plaintext = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| CipherError::InvalidLength)?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CipherError::BadPadding)?;

    serde_json::from_slice(&plaintext).map_err(|e| CipherError::Serialization(e.to_string()))
}
