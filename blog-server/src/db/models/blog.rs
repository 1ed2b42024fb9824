//! Blog Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Blog ID type
pub type BlogId = RecordId;

/// Blog model matching SurrealDB schema
///
/// `author` 在创建时写入，此后不可变更 (update 的 MERGE 数据不含 author)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<BlogId>,
    pub title: String,
    pub content: String,
    pub category: String,
    /// 所有者 (record link 指向 user 表)
    #[serde(with = "serde_helpers::record_id")]
    pub author: RecordId,
    /// 所有者用户名 (读查询的 `author.username` 投影，不落库)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// 点赞计数，只增不减，每次 +1
    #[serde(default)]
    pub likes: i64,
    /// 评论序列，只追加，顺序 = 插入顺序
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// 创建时间 (epoch 毫秒)
    pub created_at: i64,
    /// 最后修改时间 (epoch 毫秒)
    pub updated_at: i64,
}

/// 博客内嵌的评论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// 评论 ID (uuid)
    pub id: String,
    /// 评论者用户 ID ("user:xxx")，由服务端盖章，不信任请求体
    pub user: String,
    pub text: String,
    /// 创建时间 (epoch 毫秒)
    pub created_at: i64,
}

/// Blog for creation (without id)
///
/// 未声明的字段 (如调用者试图伪造的 author) 在反序列化时被丢弃。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogCreate {
    pub title: String,
    pub content: String,
    pub category: String,
}

/// Blog for update (all optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_create_ignores_unknown_fields() {
        // 调用者不能通过请求体指定 author
        let json = r#"{"title":"T","content":"C","category":"cat","author":"user:evil"}"#;
        let create: BlogCreate = serde_json::from_str(json).unwrap();
        assert_eq!(create.title, "T");
        assert_eq!(create.content, "C");
        assert_eq!(create.category, "cat");
    }

    #[test]
    fn test_blog_serializes_author_as_string() {
        let blog = Blog {
            id: None,
            title: "T".into(),
            content: "C".into(),
            category: "cat".into(),
            author: RecordId::from_table_key("user", "abc"),
            author_name: None,
            likes: 0,
            comments: vec![],
            created_at: 1,
            updated_at: 1,
        };

        let json = serde_json::to_value(&blog).unwrap();
        assert_eq!(json["author"], "user:abc");
        assert!(json.get("id").is_none());
        assert!(json.get("author_name").is_none());
    }

    #[test]
    fn test_blog_update_skips_absent_fields() {
        let update = BlogUpdate {
            title: Some("New".into()),
            content: None,
            category: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"title": "New"}));
    }
}
