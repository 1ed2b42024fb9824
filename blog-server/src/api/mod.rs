//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (注册、登录、当前用户)
//! - [`blogs`] - 博客资源接口

pub mod auth;
pub mod blogs;
pub mod health;
