//! Blog Repository
//!
//! 所有权策略在这里落地：读查询一律带 `WHERE author = $author`，
//! 写操作 (update/delete/like/comment) 只按 id 定位，不检查所有者。
//! 这是对外契约，修改前先和系统负责人确认。

use chrono::Utc;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Blog, BlogCreate, BlogUpdate, Comment};

/// 读查询的统一投影：附带所有者用户名用于展示
const OWNED_SELECT: &str = "SELECT *, author.username AS author_name FROM blog";

/// 允许的排序字段
///
/// 排序键不直接透传调用者输入：先映射到这个白名单，
/// 未知键在进入持久层之前就被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Category,
    Likes,
    CreatedAt,
}

impl SortField {
    /// 解析查询参数，未知键返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "category" => Some(Self::Category),
            "likes" => Some(Self::Likes),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    /// 对应的 schema 字段名
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::Likes => "likes",
            Self::CreatedAt => "created_at",
        }
    }
}

/// 排序方向，`asc` 之外的任何值都按降序处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Clone)]
pub struct BlogRepository {
    base: BaseRepository,
}

impl BlogRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all blogs owned by the given user, newest first
    pub async fn find_owned(&self, author: &RecordId) -> RepoResult<Vec<Blog>> {
        let blogs: Vec<Blog> = self
            .base
            .db()
            .query(format!(
                "{OWNED_SELECT} WHERE author = $author ORDER BY created_at DESC"
            ))
            .bind(("author", author.clone()))
            .await?
            .take(0)?;
        Ok(blogs)
    }

    /// Find owned blogs with an exact title match
    pub async fn find_owned_by_title(
        &self,
        author: &RecordId,
        title: &str,
    ) -> RepoResult<Vec<Blog>> {
        let blogs: Vec<Blog> = self
            .base
            .db()
            .query(format!(
                "{OWNED_SELECT} WHERE author = $author AND title = $title ORDER BY created_at DESC"
            ))
            .bind(("author", author.clone()))
            .bind(("title", title.to_string()))
            .await?
            .take(0)?;
        Ok(blogs)
    }

    /// Find owned blogs with an exact category match
    pub async fn find_owned_by_category(
        &self,
        author: &RecordId,
        category: &str,
    ) -> RepoResult<Vec<Blog>> {
        let blogs: Vec<Blog> = self
            .base
            .db()
            .query(format!(
                "{OWNED_SELECT} WHERE author = $author AND category = $category \
                 ORDER BY created_at DESC"
            ))
            .bind(("author", author.clone()))
            .bind(("category", category.to_string()))
            .await?
            .take(0)?;
        Ok(blogs)
    }

    /// Find owned blogs ordered by an allow-listed field
    ///
    /// ORDER BY 子句只由 [`SortField::column`] 和 [`SortOrder::keyword`]
    /// 的常量拼接而成，调用者输入不进入查询文本。
    pub async fn find_owned_sorted(
        &self,
        author: &RecordId,
        field: SortField,
        order: SortOrder,
    ) -> RepoResult<Vec<Blog>> {
        let blogs: Vec<Blog> = self
            .base
            .db()
            .query(format!(
                "{OWNED_SELECT} WHERE author = $author ORDER BY {} {}",
                field.column(),
                order.keyword()
            ))
            .bind(("author", author.clone()))
            .await?
            .take(0)?;
        Ok(blogs)
    }

    /// Create a new blog owned by the given user
    ///
    /// 所有者由服务端写入，创建后不可重新指派。
    /// `author` 以绑定参数传入：字段声明为 record<user>，
    /// 只有真正的 record link 能通过字段检查，字符串会被拒绝。
    pub async fn create(&self, author: &RecordId, data: BlogCreate) -> RepoResult<Blog> {
        let now = Utc::now().timestamp_millis();
        let created: Vec<Blog> = self
            .base
            .db()
            .query(
                "CREATE blog CONTENT { \
                    title: $title, \
                    content: $content, \
                    category: $category, \
                    author: $author, \
                    likes: 0, \
                    comments: [], \
                    created_at: $now, \
                    updated_at: $now \
                }",
            )
            .bind(("title", data.title))
            .bind(("content", data.content))
            .bind(("category", data.category))
            .bind(("author", author.clone()))
            .bind(("now", now))
            .await?
            .take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create blog".to_string()))
    }

    /// Update a blog by id (no ownership check)
    ///
    /// 返回 None 表示记录不存在。SurrealDB 2.x 的 UPDATE 不会创建记录。
    pub async fn update(&self, id: &RecordId, data: BlogUpdate) -> RepoResult<Option<Blog>> {
        let mut patch = serde_json::to_value(&data)
            .map_err(|e| RepoError::Database(format!("Failed to encode update: {e}")))?;
        if let serde_json::Value::Object(ref mut map) = patch {
            map.insert(
                "updated_at".to_string(),
                Utc::now().timestamp_millis().into(),
            );
        }

        let updated: Vec<Blog> = self
            .base
            .db()
            .query("UPDATE $blog MERGE $patch RETURN AFTER")
            .bind(("blog", id.clone()))
            .bind(("patch", patch))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Delete a blog by id (no ownership check)
    ///
    /// 返回被删除的记录；None 表示记录不存在。
    pub async fn delete(&self, id: &RecordId) -> RepoResult<Option<Blog>> {
        let deleted: Option<Blog> = self.base.db().delete(id.clone()).await?;
        Ok(deleted)
    }

    /// Increment the like counter by exactly 1 (no ownership check)
    ///
    /// 单条 UPDATE 语句，由存储引擎保证原子性，并发点赞不丢计数。
    pub async fn like(&self, id: &RecordId) -> RepoResult<Option<Blog>> {
        let updated: Vec<Blog> = self
            .base
            .db()
            .query("UPDATE $blog SET likes += 1, updated_at = $now RETURN AFTER")
            .bind(("blog", id.clone()))
            .bind(("now", Utc::now().timestamp_millis()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Append a comment (no ownership check on the target blog)
    ///
    /// 数组追加同样是单条原子语句，评论顺序 = 语句执行顺序。
    pub async fn add_comment(&self, id: &RecordId, comment: Comment) -> RepoResult<Option<Blog>> {
        let updated: Vec<Blog> = self
            .base
            .db()
            .query("UPDATE $blog SET comments += $comment, updated_at = $now RETURN AFTER")
            .bind(("blog", id.clone()))
            .bind(("comment", comment))
            .bind(("now", Utc::now().timestamp_millis()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }
}
