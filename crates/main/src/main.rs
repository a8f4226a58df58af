//! 主应用程序入口
//!
//! 启动 Axum Web API 服务和在场回收器。

use std::sync::Arc;
use std::time::Duration;

use application::{
    MessageService, MessageServiceDependencies, ParticipantService,
    ParticipantServiceDependencies, Reaper, SystemClock,
};
use config::AppConfig;
use infrastructure::{create_pg_pool, PgMessageRepository, PgParticipantRepository};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取环境变量配置
    let config = AppConfig::from_env_with_defaults();
    config.validate()?;

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').last().unwrap_or("unknown")
    );

    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    // 创建仓库和服务
    let participant_repository = Arc::new(PgParticipantRepository::new(pg_pool.clone()));
    let message_repository = Arc::new(PgMessageRepository::new(pg_pool));
    let clock: Arc<dyn application::Clock> = Arc::new(SystemClock);

    let participant_service = Arc::new(ParticipantService::new(ParticipantServiceDependencies {
        participant_repository: participant_repository.clone(),
        message_repository: message_repository.clone(),
        clock: clock.clone(),
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        message_repository,
        participant_repository,
        clock,
    }));

    // 回收器：进程启动即清扫一次，然后按周期运行
    let reaper = Reaper::new(
        participant_service.clone(),
        message_service.clone(),
        chrono::Duration::seconds(config.presence.inactivity_threshold_secs as i64),
    );
    let reaper_handle = reaper.spawn(Duration::from_secs(config.presence.sweep_interval_secs));

    // 启动 Web 服务器
    let app = router(AppState::new(participant_service, message_service));
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("聊天服务器启动在 http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper_handle.stop();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "无法监听 ctrl-c 信号");
    }
}
