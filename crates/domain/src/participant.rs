use serde::{Deserialize, Serialize};

use crate::value_objects::{ParticipantName, Timestamp};

/// 在线参与者。名称唯一，`last_seen` 只会前进。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: ParticipantName,
    pub last_seen: Timestamp,
}

impl Participant {
    pub fn new(name: ParticipantName, joined_at: Timestamp) -> Self {
        Self {
            name,
            last_seen: joined_at,
        }
    }

    /// 记录一次心跳；较旧的时间戳不会覆盖较新的。
    pub fn touch(&mut self, seen_at: Timestamp) {
        if seen_at > self.last_seen {
            self.last_seen = seen_at;
        }
    }

    /// `last_seen` 严格早于阈值即视为不活跃。
    pub fn is_inactive_since(&self, threshold: Timestamp) -> bool {
        self.last_seen < threshold
    }
}
