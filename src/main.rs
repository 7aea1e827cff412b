mod api;
mod keybox;
mod model;
mod web_ui;

use std::sync::Arc;

use clap::Parser;
use keybox::auth::Sha256Authenticator;
use keybox::storage::{FileKeyStorage, KeyStorage};
use keybox::store::KeyStore;
use model::arg::Args;
use model::config::Config;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // 加载配置
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        tracing::error!("加载配置失败: {}", e);
        std::process::exit(1);
    });

    // 根据配置创建存储后端
    let storage: Arc<dyn KeyStorage> = match config.key_storage_type.as_str() {
        #[cfg(feature = "postgres")]
        "postgres" => {
            let pg_config = config.postgres.clone().unwrap_or_else(|| {
                tracing::error!("keyStorageType 为 postgres，但未配置 postgres 连接信息");
                std::process::exit(1);
            });

            tracing::info!("使用 PostgreSQL 存储后端: {}", pg_config.table_name);

            let storage = keybox::storage::PostgresKeyStorage::new(
                &pg_config.database_url,
                &pg_config.table_name,
                pg_config.max_connections,
            )
            .await
            .unwrap_or_else(|e| {
                tracing::error!("连接 PostgreSQL 失败: {}", e);
                std::process::exit(1);
            });

            Arc::new(storage)
        }
        _ => {
            // 默认使用文件存储
            let keys_path = args.keys.unwrap_or_else(|| config.keys_file.clone());
            tracing::info!("使用文件存储后端: {}", keys_path);
            Arc::new(FileKeyStorage::new(&keys_path))
        }
    };

    // 初始化空存储：文件后端创建 {} 文件，PostgreSQL 后端建表
    if let Err(e) = storage.ensure_initialized().await {
        tracing::warn!("初始化存储失败，读取将按空集合处理: {}", e);
    }

    // 构造主密码校验器
    let authenticator = Sha256Authenticator::from_digest_hex(&config.master_password_sha256)
        .unwrap_or_else(|e| {
            tracing::error!("masterPasswordSha256 配置无效: {}", e);
            std::process::exit(1);
        });

    let store = Arc::new(KeyStore::new(storage));
    tracing::info!("密钥库已就绪，当前 {} 条记录", store.load().await.len());

    if config.gemini_api_key.is_empty() {
        tracing::warn!("Gemini API Key 未设置，前端相关功能不可用");
    } else {
        tracing::info!("Gemini API Key 已设置，长度 {}", config.gemini_api_key.len());
    }

    let state = Arc::new(api::AppState::new(
        config.gemini_api_key.clone(),
        store,
        Arc::new(authenticator),
    ));

    let app = api::create_api_router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("启动密钥保险箱服务: {}", addr);
    tracing::info!("可用 API:");
    tracing::info!("  GET  /");
    tracing::info!("  GET  /api/config");
    tracing::info!("  POST /api/save-keys");
    tracing::info!("  POST /api/fetch-keys");
    tracing::info!("  POST /api/delete-key");
    tracing::info!("  POST /api/clear-all-keys");
    tracing::info!("  POST /api/auto-claim-schedule");
    tracing::info!("  POST /api/chat");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        tracing::error!("监听 {} 失败: {}", addr, e);
        std::process::exit(1);
    });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("服务异常退出: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务已停止");
}

/// 等待 SIGINT / SIGTERM，返回后由 axum 优雅停机，进程以 0 退出
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut interrupt = signal(SignalKind::interrupt()).expect("安装 SIGINT 处理器失败");
        let mut terminate = signal(SignalKind::terminate()).expect("安装 SIGTERM 处理器失败");

        tokio::select! {
            _ = interrupt.recv() => tracing::info!("收到 SIGINT，开始停机"),
            _ = terminate.recv() => tracing::info!("收到 SIGTERM，开始停机"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("安装 Ctrl-C 处理器失败");
        tracing::info!("收到中断信号，开始停机");
    }
}
