//! TOTP (RFC 6238) 校验
//!
//! 参数固定：HMAC-SHA1、6 位、30 秒步长、前后各容忍 1 个步长。
//! 密钥以十六进制存储，provisioning URI 使用 base32。

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

pub const TOTP_DIGITS: u32 = 6;
pub const TOTP_STEP_SECS: i64 = 30;
pub const TOTP_WINDOW: i64 = 1;

const SECRET_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum TotpError {
    #[error("TOTP secret must be valid hex")]
    InvalidSecret,

    #[error("TOTP secret cannot be empty")]
    EmptySecret,
}

/// 生成新的十六进制密钥（20 字节）
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn decode_secret(secret_hex: &str) -> Result<Vec<u8>, TotpError> {
    let bytes = hex::decode(secret_hex.trim()).map_err(|_| TotpError::InvalidSecret)?;
    if bytes.is_empty() {
        return Err(TotpError::EmptySecret);
    }
    Ok(bytes)
}

/// 计算指定计数器的验证码
fn code_for_counter(secret: &[u8], counter: u64) -> Result<String, TotpError> {
    let mut mac = HmacSha1::new_from_slice(secret).map_err(|_| TotpError::InvalidSecret)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);

    let code = binary % 10u32.pow(TOTP_DIGITS);
    Ok(format!("{:0width$}", code, width = TOTP_DIGITS as usize))
}

/// 生成指定时间戳（Unix 秒）的验证码
pub fn generate_code(secret_hex: &str, timestamp: i64) -> Result<String, TotpError> {
    let secret = decode_secret(secret_hex)?;
    let counter = (timestamp.max(0) / TOTP_STEP_SECS) as u64;
    code_for_counter(&secret, counter)
}

/// 校验验证码，允许前后各一个步长的时钟偏差
pub fn verify_code(secret_hex: &str, code: &str, timestamp: i64) -> Result<bool, TotpError> {
    let secret = decode_secret(secret_hex)?;
    let code = code.trim();
    if code.len() != TOTP_DIGITS as usize || !code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(false);
    }

    let current = timestamp.max(0) / TOTP_STEP_SECS;
    let mut matched = false;
    for delta in -TOTP_WINDOW..=TOTP_WINDOW {
        let counter = current + delta;
        if counter < 0 {
            continue;
        }
        let expected = code_for_counter(&secret, counter as u64)?;
        if bool::from(expected.as_bytes().ct_eq(code.as_bytes())) {
            matched = true;
        }
    }
    Ok(matched)
}

/// 生成 otpauth:// provisioning URI（供认证器扫码）
pub fn provisioning_uri(issuer: &str, account: &str, secret_hex: &str) -> Result<String, TotpError> {
    let secret = decode_secret(secret_hex)?;
    Ok(format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}&algorithm=SHA1&digits={}&period={}",
        percent_encode(issuer),
        percent_encode(account),
        BASE32_NOPAD.encode(&secret),
        percent_encode(issuer),
        TOTP_DIGITS,
        TOTP_STEP_SECS
    ))
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
