//! Blog API 模块
//!
//! # 路由列表 (全部需要认证)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/blogs | GET | 列出当前用户的博客 |
//! | /api/blogs | POST | 创建博客 (所有者 = 当前用户) |
//! | /api/blogs/title | GET | 按标题精确过滤 (仅自己的) |
//! | /api/blogs/category | GET | 按分类精确过滤 (仅自己的) |
//! | /api/blogs/sort | GET | 按白名单字段排序 (仅自己的) |
//! | /api/blogs/{id} | PUT | 按 id 更新 (不检查所有者) |
//! | /api/blogs/{id} | DELETE | 按 id 删除 (不检查所有者) |
//! | /api/blogs/{id}/like | PATCH | 点赞 +1 (不检查所有者) |
//! | /api/blogs/{id}/comment | PATCH | 追加评论 (不检查所有者) |

mod handler;

use axum::{
    Router,
    routing::{get, patch, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/blogs", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/title", get(handler::list_by_title))
        .route("/category", get(handler::list_by_category))
        .route("/sort", get(handler::list_sorted))
        .route("/{id}", put(handler::update).delete(handler::remove))
        .route("/{id}/like", patch(handler::like))
        .route("/{id}/comment", patch(handler::comment))
}
