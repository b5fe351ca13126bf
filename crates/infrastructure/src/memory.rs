//! 内存存储实现
//!
//! 参与者表与消息日志各由一把锁保护，每个操作在锁内完成，
//! 因此注册、心跳、清理彼此串行，写入顺序即消息日志顺序。

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{
    Message, MessageLimit, MessageRepository, Participant, ParticipantRepository,
    RepositoryError, RepositoryResult, Timestamp,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryParticipantRepository {
    participants: RwLock<HashMap<String, Participant>>,
}

impl MemoryParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRepository for MemoryParticipantRepository {
    async fn insert(&self, participant: Participant) -> RepositoryResult<Participant> {
        let mut participants = self.participants.write().await;
        let key = participant.name.as_str().to_owned();
        if participants.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        participants.insert(key, participant.clone());
        Ok(participant)
    }

    async fn touch(&self, name: &str, seen_at: Timestamp) -> RepositoryResult<Participant> {
        let mut participants = self.participants.write().await;
        let participant = participants
            .get_mut(name)
            .ok_or(RepositoryError::NotFound)?;
        participant.touch(seen_at);
        Ok(participant.clone())
    }

    async fn remove(&self, name: &str) -> RepositoryResult<bool> {
        let mut participants = self.participants.write().await;
        Ok(participants.remove(name).is_some())
    }

    async fn find(&self, name: &str) -> RepositoryResult<Option<Participant>> {
        let participants = self.participants.read().await;
        Ok(participants.get(name).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Participant>> {
        let participants = self.participants.read().await;
        Ok(participants.values().cloned().collect())
    }

    async fn remove_inactive(&self, threshold: Timestamp) -> RepositoryResult<Vec<Participant>> {
        let mut participants = self.participants.write().await;
        let mut evicted = Vec::new();
        participants.retain(|_, participant| {
            if participant.is_inactive_since(threshold) {
                evicted.push(participant.clone());
                false
            } else {
                true
            }
        });
        Ok(evicted)
    }
}

#[derive(Debug, Default)]
pub struct MemoryMessageRepository {
    log: RwLock<Vec<Message>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn append(&self, message: Message) -> RepositoryResult<Message> {
        let mut log = self.log.write().await;
        log.push(message.clone());
        Ok(message)
    }

    async fn visible_to(
        &self,
        requester: &str,
        limit: Option<MessageLimit>,
    ) -> RepositoryResult<Vec<Message>> {
        let log = self.log.read().await;
        let mut visible: Vec<Message> = log
            .iter()
            .filter(|message| message.is_visible_to(requester))
            .cloned()
            .collect();

        if let Some(limit) = limit {
            let skip = visible.len().saturating_sub(limit.get());
            visible.drain(..skip);
        }
        Ok(visible)
    }
}
