//! 认证模块
//!
//! JWT Token 管理和密码校验

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtManager};
pub use password::{hash_password, verify_password};
