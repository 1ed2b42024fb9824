use crate::auth::JwtConfig;

/// 服务器配置 - 博客服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | SERVER_HOST | 0.0.0.0 | 监听地址 |
/// | SERVER_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | ./data/blog.db | 嵌入式数据库路径 |
/// | DATABASE_NAMESPACE | blog | SurrealDB namespace |
/// | DATABASE_NAME | blog | SurrealDB database |
/// | JWT_SECRET | (开发环境自动生成) | JWT 签名密钥，至少 32 字符 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 (分钟) |
/// | JWT_ISSUER | blog-server | 令牌签发者 |
/// | JWT_AUDIENCE | blog-clients | 令牌受众 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 生命周期
///
/// 进程启动时加载一次，此后不可变。[`JwtService`](crate::auth::JwtService)
/// 和数据库层在构造时显式接收各自的配置段。
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/blog.db SERVER_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 监听地址
    pub server_host: String,
    /// HTTP API 服务端口
    pub server_port: u16,
    /// 嵌入式数据库文件路径
    pub database_path: String,
    /// SurrealDB namespace
    pub database_namespace: String,
    /// SurrealDB database
    pub database_name: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/blog.db".into()),
            database_namespace: std::env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "blog".into()),
            database_name: std::env::var("DATABASE_NAME").unwrap_or_else(|_| "blog".into()),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
