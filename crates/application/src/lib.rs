//! 应用层实现。
//!
//! 围绕领域模型提供用例服务：参与者注册与心跳、消息投递与查询，
//! 以及后台的在线状态清理任务。存储通过领域层定义的接口注入。

pub mod clock;
pub mod dto;
pub mod error;
pub mod services;
pub mod sweeper;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dto::{MessageDto, ParticipantDto};
pub use error::ApplicationError;
pub use services::{
    MessageService, MessageServiceDependencies, ParticipantService,
    ParticipantServiceDependencies,
};
pub use sweeper::{PresenceSweeper, SweepReport, SweeperHandle, SweeperSettings};
pub use validation::{field_errors, validate_input, NewMessageInput, RegisterParticipantInput};
