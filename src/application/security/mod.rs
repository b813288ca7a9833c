//! Security primitives - 加密、TOTP、JWT、密码哈希

pub mod cipher;
pub mod jwt;
pub mod password;
pub mod totp;

pub use cipher::{decrypt_payload, encrypt_payload, CipherError, EncryptedPayload, KeyDerivation};
pub use jwt::{Claims, TokenError, TokenService};
pub use password::{hash_password, verify_password, PasswordError};
pub use totp::TotpError;
