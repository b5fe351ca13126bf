use std::sync::Arc;

use application::{Clock, ManualClock, PresenceSweeper, SweeperSettings};
use domain::{MessageRepository, ParticipantRepository};
use infrastructure::{MemoryMessageRepository, MemoryParticipantRepository};
use reqwest::Client;
use time::macros::datetime;
use tokio::{net::TcpListener, sync::oneshot};
use web_api::{router, AppState};

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub clock: Arc<ManualClock>,
    pub sweeper: PresenceSweeper,
    _shutdown: oneshot::Sender<()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn memory_state() -> (AppState, PresenceSweeper, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(datetime!(2024-05-01 12:00:00 UTC)));
    let participants: Arc<dyn ParticipantRepository> = Arc::new(MemoryParticipantRepository::new());
    let messages: Arc<dyn MessageRepository> = Arc::new(MemoryMessageRepository::new());
    let dyn_clock: Arc<dyn Clock> = clock.clone();

    let state = AppState::new(participants.clone(), messages.clone(), dyn_clock.clone());
    let sweeper = PresenceSweeper::new(participants, messages, dyn_clock, SweeperSettings::default());
    (state, sweeper, clock)
}

/// 在随机端口上启动服务；`TestApp` 被丢弃时服务随之关闭
pub async fn spawn_app() -> TestApp {
    let (state, sweeper, clock) = memory_state();
    let app = router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: Client::new(),
        clock,
        sweeper,
        _shutdown: shutdown_tx,
    }
}
