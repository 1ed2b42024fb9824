//! User Repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::User;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user with a pre-hashed password
    ///
    /// username 上有 UNIQUE 索引，先查重给出友好错误；并发注册时
    /// 查重之后才插入的一方会撞上索引冲突，同样映射为 Duplicate。
    pub async fn create(&self, username: &str, hashed_password: &str) -> RepoResult<User> {
        if self.find_by_username(username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let user = User {
            id: None,
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: Utc::now().timestamp_millis(),
        };

        let created: Option<User> = match self.base.db().create(TABLE).content(user).await {
            Ok(created) => created,
            Err(e) if is_unique_index_violation(&e) => {
                return Err(RepoError::Duplicate(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
            Err(e) => return Err(e.into()),
        };
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }
}

/// UNIQUE 索引冲突 (区别于其他持久层故障，冲突是客户端可见的结果)
fn is_unique_index_violation(err: &surrealdb::Error) -> bool {
    matches!(
        err,
        surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. })
    ) || err.to_string().contains("already contains")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> (Surreal<Db>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = crate::db::init_db(
            dir.path().join("blog.db").to_str().expect("utf-8 path"),
            "test",
            "test",
        )
        .await
        .expect("Failed to init db");
        (db, dir)
    }

    #[tokio::test]
    async fn test_duplicate_username_is_duplicate_error() {
        let (db, _dir) = test_db().await;
        let repo = UserRepository::new(db);

        repo.create("alice", "hash-a").await.expect("first create failed");

        match repo.create("alice", "hash-b").await {
            Err(RepoError::Duplicate(_)) => {}
            other => panic!("Expected Duplicate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_index_violation_classified_as_duplicate() {
        let (db, _dir) = test_db().await;
        let repo = UserRepository::new(db.clone());

        repo.create("alice", "hash-a").await.expect("first create failed");

        // 绕过查重直接插入，制造真正的索引冲突
        let dup = User {
            id: None,
            username: "alice".to_string(),
            hashed_password: "hash-b".to_string(),
            created_at: 0,
        };
        let result: Result<Option<User>, surrealdb::Error> =
            db.create(TABLE).content(dup).await;
        let err = match result {
            Err(e) => e,
            Ok(_) => panic!("Unique index did not reject duplicate username"),
        };
        assert!(is_unique_index_violation(&err));
    }
}
