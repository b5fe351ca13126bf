//! 聊天中继核心领域模型
//!
//! 包含在线参与者、消息日志、可见性规则，以及存储抽象接口。

pub mod errors;
pub mod message;
pub mod participant;
pub mod repository;
pub mod value_objects;
pub mod visibility;

// 重新导出常用类型
pub use errors::*;
pub use message::{Message, MessageKind, NewMessage};
pub use participant::Participant;
pub use repository::{MessageRepository, ParticipantRepository, RepositoryResult};
pub use value_objects::{MessageLimit, ParticipantName, Timestamp};
pub use visibility::{is_visible_to, EVERYONE};

#[cfg(feature = "testing")]
pub use repository::{MockMessageRepository, MockParticipantRepository};
