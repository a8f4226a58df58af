//! 不活跃参与者回收器。
//!
//! 周期性调用清扫，并为每个被移除的参与者广播一条离场通告。
//! 单次 tick 的失败只记录日志，不会中止后续 tick。

use std::sync::Arc;
use std::time::Duration as TickPeriod;

use chrono::Duration;
use tokio::task::JoinHandle;

use domain::ParticipantName;

use crate::{
    error::ApplicationError,
    services::{MessageService, ParticipantService},
};

/// 单次清扫的结果；由调度方记录日志，不向外抛出异常。
#[derive(Debug, Default)]
pub struct SweepReport {
    pub departed: Vec<ParticipantName>,
    pub failed_notices: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.departed.is_empty()
    }
}

pub struct Reaper {
    participants: Arc<ParticipantService>,
    messages: Arc<MessageService>,
    threshold: Duration,
}

impl Reaper {
    pub fn new(
        participants: Arc<ParticipantService>,
        messages: Arc<MessageService>,
        threshold: Duration,
    ) -> Self {
        Self {
            participants,
            messages,
            threshold,
        }
    }

    /// 单次清扫：移除过期参与者，逐个广播离场通告。
    ///
    /// 清扫的删除与读取是同一原子步骤，并发 tick 不会把同一
    /// 参与者上报两次。某条通告写入失败不影响其余通告。
    pub async fn run_tick(&self) -> Result<SweepReport, ApplicationError> {
        let removed = self.participants.sweep_expired(self.threshold).await?;

        let mut report = SweepReport::default();
        for participant in removed {
            if let Err(err) = self.messages.post_departure_notice(&participant.name).await {
                report.failed_notices += 1;
                tracing::error!(
                    participant = %participant.name,
                    error = %err,
                    "离场通告写入失败"
                );
            }
            report.departed.push(participant.name);
        }
        Ok(report)
    }

    /// 启动周期任务：首个 tick 立即执行，之后每 `period` 一次，
    /// 直到句柄被停止。
    pub fn spawn(self, period: TickPeriod) -> ReaperHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match self.run_tick().await {
                    Ok(report) if !report.is_empty() => {
                        tracing::info!(
                            removed = report.departed.len(),
                            failed_notices = report.failed_notices,
                            "清扫不活跃参与者"
                        );
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!(error = %err, "清扫 tick 失败");
                    }
                }
            }
        });
        ReaperHandle { task }
    }
}

/// 回收器任务句柄。
pub struct ReaperHandle {
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// 注销周期任务；已在途的存储调用自行完成，结果被丢弃。
    pub fn stop(&self) {
        self.task.abort();
    }
}
