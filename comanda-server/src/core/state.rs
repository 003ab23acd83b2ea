use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::ImageStore;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是整个 API 的核心数据结构。
/// 使用 Arc / 连接池实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 嵌入式数据库连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | images | ImageStore | 上传图片存储 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SQLite)
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 上传图片存储
    pub images: ImageStore,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 方法代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        images: ImageStore,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            images,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/comanda.db) + 迁移
    /// 3. JWT 服务与图片存储
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("comanda.db");
        let db_path_str = db_path.to_string_lossy();
        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");

        // 2. Initialize services
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let images = ImageStore::new(config.uploads_dir());

        Self::new(config.clone(), db_service.pool, jwt_service, images)
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
