use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::sync_worker::{self, ContentSyncHandle};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / pool 浅拷贝，克隆成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | content_sync | 内容状态同步队列句柄 |
/// | shutdown | 后台任务关闭信号 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 内容同步队列 (fire-and-forget)
    pub content_sync: ContentSyncHandle,
    /// 关闭信号
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/market.db) + 迁移
    /// 3. JWT 服务
    /// 4. 内容同步后台任务
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_dir().join("market.db");
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(|e| anyhow::anyhow!("database initialization failed: {e}"))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let shutdown = CancellationToken::new();
        let content_sync = sync_worker::spawn(db.pool.clone(), shutdown.clone());

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service,
            content_sync,
            shutdown,
        })
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 请求后台任务停止
    pub fn shutdown_background_tasks(&self) {
        self.shutdown.cancel();
    }
}
