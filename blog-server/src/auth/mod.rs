//! 认证模块
//!
//! JWT 令牌的生成、验证，以及保护 `/api` 路由的中间件。

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
