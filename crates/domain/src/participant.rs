use serde::{Deserialize, Serialize};

use crate::value_objects::{ParticipantName, Timestamp};

/// 在线参与者的存在记录。
///
/// `last_status` 在加入和心跳时刷新；超过不活跃阈值后由回收器删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: ParticipantName,
    #[serde(rename = "lastStatus", with = "chrono::serde::ts_milliseconds")]
    pub last_status: Timestamp,
}

impl Participant {
    pub fn join(name: ParticipantName, now: Timestamp) -> Self {
        Self {
            name,
            last_status: now,
        }
    }

    /// 心跳：刷新存活时间戳。
    pub fn touch(&mut self, now: Timestamp) {
        self.last_status = now;
    }

    /// 是否已超过不活跃阈值。
    pub fn is_expired(&self, cutoff: Timestamp) -> bool {
        self.last_status < cutoff
    }
}
