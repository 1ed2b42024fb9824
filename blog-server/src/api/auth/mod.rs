//! Auth API 模块

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 公共路由 (require_auth 中间件放行)
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        // 需要认证
        .route("/me", get(handler::me))
}
