//! User Context - 用户限界上下文
//!
//! 职责:
//! - 用户身份与角色
//! - 二次验证状态（TOTP / Passkey）
//! - 每日合成额度

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{PublicUser, User};
pub use entities::PasskeyCredential;
pub use errors::UserError;
pub use value_objects::{Email, Role, SecondFactor, UserId, Username};
