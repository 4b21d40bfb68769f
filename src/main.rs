//! 商品发布平台主入口

use marketplace_api::{
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{
        AccountRepository, ListingRepository, MemoryAccountRepository, MemoryListingRepository,
        PgAccountRepository, PgListingRepository,
    },
    routes, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();
    let mut in_memory = false;

    if let Some(arg) = args.get(1) {
        match arg.as_str() {
            "--version" => {
                println!("marketplace-api {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "--in-memory" => in_memory = true,
            _ => {
                eprintln!("未知参数: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.server.environment,
        "Marketplace API starting..."
    );

    // 3. 存储：PostgreSQL 或内存
    let (accounts, listings): (Arc<dyn AccountRepository>, Arc<dyn ListingRepository>) =
        if in_memory {
            tracing::warn!("Running with in-memory storage, data is lost on exit");
            (
                Arc::new(MemoryAccountRepository::new()),
                Arc::new(MemoryListingRepository::new()),
            )
        } else {
            let db_pool = db::connect(&config.database).await?;
            db::spawn_pool_metrics(db_pool.clone());
            (
                Arc::new(PgAccountRepository::new(db_pool.clone())),
                Arc::new(PgListingRepository::new(db_pool)),
            )
        };

    // 4. 构建应用状态与路由
    let shutdown_timeout = config.server.graceful_shutdown_timeout_secs;
    let addr = config.server.addr.clone();
    let app_state = Arc::new(AppState::new(config, accounts, listings)?);
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制退出
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("marketplace-api {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: marketplace-api [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!("  --in-memory   使用内存存储运行（不连接数据库）");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 APP_ 前缀的环境变量完成");
    println!("  例如 APP_SECURITY__ACCESS_TOKEN_SECRET, APP_DATABASE__URL");
}
