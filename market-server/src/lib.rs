//! Market Server - 广告主/站长撮合市场后端
//!
//! # 架构概述
//!
//! 本模块是市场后端的主入口，提供以下核心功能：
//!
//! - **订单引擎** (`orders`): 购物车落单、状态机流转、跨实体引用解析、趋势聚合
//! - **数据库** (`db`): 嵌入式 SQLite 存储与仓储层
//! - **认证** (`auth`): JWT 校验与角色中间件
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! market-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! ├── orders/        # 订单引擎
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let level = std::env::var("LOG_LEVEL").ok();
    utils::logger::init_logger_with_file(level.as_deref(), None);
}
