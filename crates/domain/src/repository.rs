//! 存储接口定义
//!
//! 内层定义接口，外层（内存 / PostgreSQL）实现接口。
//! 每个方法对单个参与者名称都是原子的。

use async_trait::async_trait;

use crate::errors::RepositoryError;
use crate::message::Message;
use crate::participant::Participant;
use crate::value_objects::{MessageLimit, Timestamp};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// 新增参与者；同名参与者仍在线时返回 [`RepositoryError::Conflict`]，不覆盖。
    async fn insert(&self, participant: Participant) -> RepositoryResult<Participant>;

    /// 刷新 `last_seen`（取较大值）；不存在时返回 [`RepositoryError::NotFound`]。
    async fn touch(&self, name: &str, seen_at: Timestamp) -> RepositoryResult<Participant>;

    /// 删除指定参与者，返回是否确实删除了一条记录。
    async fn remove(&self, name: &str) -> RepositoryResult<bool>;

    async fn find(&self, name: &str) -> RepositoryResult<Option<Participant>>;

    /// 当前在线参与者快照，顺序无意义。
    async fn list(&self) -> RepositoryResult<Vec<Participant>>;

    /// 一次原子扫描，删除并返回所有 `last_seen < threshold` 的参与者。
    async fn remove_inactive(&self, threshold: Timestamp) -> RepositoryResult<Vec<Participant>>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 追加到日志末尾。
    async fn append(&self, message: Message) -> RepositoryResult<Message>;

    /// 按写入顺序（从旧到新）返回 `requester` 可见的消息；
    /// 给定 `limit` 时只保留最新的 `limit` 条。
    async fn visible_to(
        &self,
        requester: &str,
        limit: Option<MessageLimit>,
    ) -> RepositoryResult<Vec<Message>>;
}
