//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 引擎) 的初始化和 schema 定义。

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use shared::AppError;

/// 打开数据库并定义 schema
///
/// 连接参数在进程启动时传入一次，此后数据库句柄通过
/// [`ServerState`](crate::core::ServerState) 共享 (廉价克隆，内部同步)。
pub async fn init_db(path: &str, namespace: &str, database: &str) -> Result<Surreal<Db>, AppError> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::database(format!("Failed to create database dir: {e}")))?;
    }

    let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

    db.use_ns(namespace)
        .use_db(database)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

    define_schema(&db).await?;

    tracing::info!("Database ready at {} ({}:{})", path, namespace, database);

    Ok(db)
}

/// 定义表、字段和索引
///
/// `blog.author` 必须是 record<user>，否则 `author.username` 投影
/// 和按 author 过滤的查询都不工作。
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    let statements = [
        "DEFINE TABLE IF NOT EXISTS user SCHEMALESS",
        "DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE",
        "DEFINE TABLE IF NOT EXISTS blog SCHEMALESS",
        "DEFINE FIELD IF NOT EXISTS author ON blog TYPE record<user>",
        "DEFINE INDEX IF NOT EXISTS blog_author ON blog FIELDS author",
    ];

    for statement in statements {
        db.query(statement)
            .await
            .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;
    }

    Ok(())
}
