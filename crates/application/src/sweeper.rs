//! 在线状态清理任务
//!
//! 按固定间隔清理超过不活跃窗口未心跳的参与者，
//! 并为每个被清理的参与者追加一条“离开”状态消息。
//! 只通过存储接口的原子操作与共享状态交互。

use std::sync::Arc;
use std::time::Duration;

use config::PresenceConfig;
use domain::{message::LEFT_TEXT, MessageRepository, NewMessage, Participant, ParticipantRepository};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{clock::Clock, error::ApplicationError};

/// 清理任务配置
#[derive(Debug, Clone, Copy)]
pub struct SweeperSettings {
    /// 两次清理之间的间隔
    pub sweep_interval: Duration,
    /// 不活跃窗口
    pub inactivity_window: Duration,
}

impl Default for SweeperSettings {
    fn default() -> Self {
        Self::from(&PresenceConfig::default())
    }
}

impl From<&PresenceConfig> for SweeperSettings {
    fn from(config: &PresenceConfig) -> Self {
        Self {
            sweep_interval: config.sweep_interval(),
            inactivity_window: config.inactivity_window(),
        }
    }
}

/// 单次清理的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: Vec<Participant>,
    /// 未能写入“离开”通知的参与者数量
    pub failed_notices: usize,
}

pub struct PresenceSweeper {
    participants: Arc<dyn ParticipantRepository>,
    messages: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
    settings: SweeperSettings,
}

impl PresenceSweeper {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        messages: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
        settings: SweeperSettings,
    ) -> Self {
        Self {
            participants,
            messages,
            clock,
            settings,
        }
    }

    /// 执行一次清理。清理扫描失败时返回错误；单条通知写入失败只记录日志。
    pub async fn sweep_once(&self) -> Result<SweepReport, ApplicationError> {
        let now = self.clock.now();
        let threshold = now - self.settings.inactivity_window;

        let evicted = self.participants.remove_inactive(threshold).await?;
        let mut failed_notices = 0;

        for participant in &evicted {
            let notice = NewMessage::status(participant.name.as_str(), LEFT_TEXT).stamp(now);
            match self.messages.append(notice).await {
                Ok(_) => {
                    tracing::info!(participant = %participant.name, "participant left (inactive)");
                }
                Err(err) => {
                    failed_notices += 1;
                    tracing::error!(
                        participant = %participant.name,
                        error = %err,
                        "failed to append leave notice"
                    );
                }
            }
        }

        if !evicted.is_empty() {
            tracing::info!(
                evicted = evicted.len(),
                failed_notices,
                "presence sweep finished"
            );
        }

        Ok(SweepReport {
            evicted,
            failed_notices,
        })
    }

    /// 启动后台清理任务，首次清理在一个间隔之后执行
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = self.settings.sweep_interval;
        let window = self.settings.inactivity_window;

        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = self.sweep_once().await {
                            tracing::error!(error = %err, "presence sweep failed");
                        }
                    }
                }
            }

            tracing::info!("presence sweeper stopped");
        });

        tracing::info!(
            interval_secs = period.as_secs(),
            window_secs = window.as_secs(),
            "presence sweeper started"
        );

        SweeperHandle { cancel, join }
    }
}

/// 运行中清理任务的句柄
pub struct SweeperHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// 停止任务并等待其退出
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.join.await {
            tracing::error!(error = %err, "presence sweeper task aborted");
        }
    }
}
