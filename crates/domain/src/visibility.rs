//! 消息可见性规则

use crate::message::{Message, MessageKind};

/// 保留的“所有人”收件人标识。
pub const EVERYONE: &str = "Todos";

/// 判断 `requester` 能否看到 `message`。
///
/// 公开消息与发给 [`EVERYONE`] 的消息对所有人可见；
/// 私信与定向消息只对发送方和收件方可见。逐条判断，不依赖其他消息。
pub fn is_visible_to(requester: &str, message: &Message) -> bool {
    message.kind == MessageKind::Message
        || message.to == requester
        || message.from == requester
        || message.to == EVERYONE
}

impl Message {
    pub fn is_visible_to(&self, requester: &str) -> bool {
        is_visible_to(requester, self)
    }
}
