use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::Timestamp;
use crate::visibility::EVERYONE;

/// 状态通知的固定文案。
pub const JOINED_TEXT: &str = "joined the room";
pub const LEFT_TEXT: &str = "left the room";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// 公开广播
    Message,
    /// 点对点私信
    PrivateMessage,
    /// 系统生成的进出通知
    Status,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
            MessageKind::Status => "status",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageKind::Message),
            "private_message" => Ok(MessageKind::PrivateMessage),
            "status" => Ok(MessageKind::Status),
            other => Err(DomainError::invalid_argument(
                "type",
                format!("unknown message type '{other}'"),
            )),
        }
    }
}

/// 已写入日志的消息，写入后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(with = "time::serde::rfc3339")]
    pub time: Timestamp,
}

/// 待写入的消息；`time` 为空时由写入方补上当前时间。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
    pub time: Option<Timestamp>,
}

impl NewMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
            kind,
            time: None,
        }
    }

    /// 发给所有人的状态通知。
    pub fn status(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(from, EVERYONE, text, MessageKind::Status)
    }

    pub fn at(mut self, time: Timestamp) -> Self {
        self.time = Some(time);
        self
    }

    pub fn stamp(self, now: Timestamp) -> Message {
        Message {
            from: self.from,
            to: self.to,
            text: self.text,
            kind: self.kind,
            time: self.time.unwrap_or(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn stamp_keeps_existing_time() {
        let preset = datetime!(2024-01-01 00:00:00 UTC);
        let message = NewMessage::new("a", "b", "hi", MessageKind::PrivateMessage)
            .at(preset)
            .stamp(datetime!(2024-06-01 00:00:00 UTC));
        assert_eq!(message.time, preset);
    }

    #[test]
    fn stamp_fills_missing_time() {
        let now = datetime!(2024-06-01 10:30:00 UTC);
        let message = NewMessage::status("x", LEFT_TEXT).stamp(now);
        assert_eq!(message.time, now);
        assert_eq!(message.to, EVERYONE);
        assert_eq!(message.kind, MessageKind::Status);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            MessageKind::Message,
            MessageKind::PrivateMessage,
            MessageKind::Status,
        ] {
            assert_eq!(kind.as_str().parse::<MessageKind>().unwrap(), kind);
        }
        assert!("shout".parse::<MessageKind>().is_err());
    }

    #[test]
    fn serializes_kind_as_type_field() {
        let message = NewMessage::new("a", EVERYONE, "oi", MessageKind::Message)
            .stamp(datetime!(2024-06-01 10:30:00 UTC));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["time"], "2024-06-01T10:30:00Z");
    }
}
