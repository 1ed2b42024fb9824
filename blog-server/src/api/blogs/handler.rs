//! Blog Handlers
//!
//! 读接口只返回当前用户拥有的博客；写接口按 id 直接操作。
//! 输入校验在进入持久层之前完成。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Blog, BlogCreate, BlogUpdate, Comment};
use crate::db::repository::{BlogRepository, SortField, SortOrder, parse_record_id};
use crate::utils::validation::{
    MAX_CATEGORY_LEN, MAX_COMMENT_LEN, MAX_CONTENT_LEN, MAX_TITLE_LEN, validate_optional_text,
    validate_required_text,
};
use shared::{ApiResponse, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

/// 当前用户在 blog 表里的 record link
fn author_ref(user: &CurrentUser) -> RecordId {
    parse_record_id("user", &user.id)
}

/// List current user's blogs, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Blog>>>> {
    let repo = BlogRepository::new(state.get_db());
    let blogs = repo.find_owned(&author_ref(&user)).await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// List current user's blogs with an exact title match
pub async fn list_by_title(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<ApiResponse<Vec<Blog>>>> {
    validate_required_text(&query.title, "title", MAX_TITLE_LEN)?;

    let repo = BlogRepository::new(state.get_db());
    let blogs = repo
        .find_owned_by_title(&author_ref(&user), &query.title)
        .await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// List current user's blogs with an exact category match
pub async fn list_by_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<Blog>>>> {
    validate_required_text(&query.category, "category", MAX_CATEGORY_LEN)?;

    let repo = BlogRepository::new(state.get_db());
    let blogs = repo
        .find_owned_by_category(&author_ref(&user), &query.category)
        .await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// List current user's blogs sorted by an allow-listed field
///
/// 未知排序键返回 400，不默默回退到默认排序。
pub async fn list_sorted(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SortQuery>,
) -> AppResult<Json<ApiResponse<Vec<Blog>>>> {
    let field = match query.sort.as_deref() {
        Some(raw) => SortField::parse(raw).ok_or_else(|| AppError::sort_field_invalid(raw))?,
        None => SortField::CreatedAt,
    };
    let order = SortOrder::from_query(query.order.as_deref());

    let repo = BlogRepository::new(state.get_db());
    let blogs = repo
        .find_owned_sorted(&author_ref(&user), field, order)
        .await?;
    Ok(Json(ApiResponse::success(blogs)))
}

/// Create a blog owned by the current user
///
/// 请求体里的任何 author 字段都被忽略，所有者永远是令牌里的用户。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(body): Json<BlogCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Blog>>)> {
    validate_required_text(&body.title, "title", MAX_TITLE_LEN)?;
    validate_required_text(&body.content, "content", MAX_CONTENT_LEN)?;
    validate_required_text(&body.category, "category", MAX_CATEGORY_LEN)?;

    let repo = BlogRepository::new(state.get_db());
    let blog = repo.create(&author_ref(&user), body).await?;

    tracing::info!(
        blog_id = ?blog.id,
        username = %user.username,
        "Blog created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Blog created", blog)),
    ))
}

/// Update a blog by id
pub async fn update(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<BlogUpdate>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    validate_optional_text(&body.title, "title", MAX_TITLE_LEN)?;
    validate_optional_text(&body.content, "content", MAX_CONTENT_LEN)?;
    validate_optional_text(&body.category, "category", MAX_CATEGORY_LEN)?;

    let blog_id = parse_record_id("blog", &id);
    let repo = BlogRepository::new(state.get_db());

    let blog = repo
        .update(&blog_id, body)
        .await?
        .ok_or_else(|| AppError::blog_not_found(&id))?;

    Ok(Json(ApiResponse::success_with_message("Blog updated", blog)))
}

/// Delete a blog by id
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let blog_id = parse_record_id("blog", &id);
    let repo = BlogRepository::new(state.get_db());

    let blog = repo
        .delete(&blog_id)
        .await?
        .ok_or_else(|| AppError::blog_not_found(&id))?;

    tracing::info!(blog_id = %id, username = %user.username, "Blog deleted");

    Ok(Json(ApiResponse::success_with_message("Blog deleted", blog)))
}

/// Increment a blog's like counter by 1
pub async fn like(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let blog_id = parse_record_id("blog", &id);
    let repo = BlogRepository::new(state.get_db());

    let blog = repo
        .like(&blog_id)
        .await?
        .ok_or_else(|| AppError::blog_not_found(&id))?;

    Ok(Json(ApiResponse::success(blog)))
}

/// Append a comment to a blog
///
/// 评论者身份由服务端从令牌取，时间戳和评论 ID 也由服务端生成。
pub async fn comment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<CommentBody>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    validate_required_text(&body.text, "text", MAX_COMMENT_LEN)?;

    let blog_id = parse_record_id("blog", &id);
    let repo = BlogRepository::new(state.get_db());

    let comment = Comment {
        id: uuid::Uuid::new_v4().to_string(),
        user: user.id.clone(),
        text: body.text,
        created_at: chrono::Utc::now().timestamp_millis(),
    };

    let blog = repo
        .add_comment(&blog_id, comment)
        .await?
        .ok_or_else(|| AppError::blog_not_found(&id))?;

    Ok(Json(ApiResponse::success_with_message(
        "Comment added",
        blog,
    )))
}
