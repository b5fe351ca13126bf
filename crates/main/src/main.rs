//! 主应用程序入口
//!
//! 加载配置、选择存储后端、启动在线状态清理任务与 Axum Web 服务。

use std::sync::Arc;

use application::{Clock, PresenceSweeper, SweeperSettings, SystemClock};
use config::AppConfig;
use domain::{MessageRepository, ParticipantRepository};
use infrastructure::{
    create_pg_pool, MemoryMessageRepository, MemoryParticipantRepository, PgMessageRepository,
    PgParticipantRepository, MIGRATOR,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

type Repositories = (Arc<dyn ParticipantRepository>, Arc<dyn MessageRepository>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志，未设置 RUST_LOG 时默认 info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let (participants, messages) = repositories(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let sweeper = Arc::new(PresenceSweeper::new(
        participants.clone(),
        messages.clone(),
        clock.clone(),
        SweeperSettings::from(&config.presence),
    ));
    let sweeper_handle = sweeper.start();

    let state = AppState::new(participants, messages, clock);
    let app = router(state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("聊天中继服务启动在 http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper_handle.stop().await;
    tracing::info!("服务已停止");

    Ok(())
}

async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match &config.database.url {
        Some(database_url) => {
            tracing::info!(
                "连接数据库: {}",
                database_url.split('@').last().unwrap_or("unknown")
            );
            let pool = create_pg_pool(database_url, config.database.max_connections).await?;
            MIGRATOR.run(&pool).await?;

            Ok((
                Arc::new(PgParticipantRepository::new(pool.clone())),
                Arc::new(PgMessageRepository::new(pool)),
            ))
        }
        None => {
            tracing::info!("未配置数据库，使用内存存储");
            Ok((
                Arc::new(MemoryParticipantRepository::new()),
                Arc::new(MemoryMessageRepository::new()),
            ))
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "无法监听退出信号");
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，开始优雅关闭");
}
