use std::sync::Arc;

use domain::{
    DomainError, FieldError, Message, MessageLimit, MessageRepository, NewMessage,
    ParticipantRepository,
};

use crate::{
    clock::Clock,
    error::ApplicationError,
    validation::{validate_input, NewMessageInput},
};

pub struct MessageServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 客户端发消息：校验输入，要求发送方当前在线。
    pub async fn post(
        &self,
        sender: &str,
        input: NewMessageInput,
    ) -> Result<Message, ApplicationError> {
        validate_input(&input)?;
        let kind = input.message_kind()?;

        if self
            .deps
            .participant_repository
            .find(sender)
            .await?
            .is_none()
        {
            return Err(DomainError::validation(vec![FieldError::new(
                "from",
                "unknown participant",
            )])
            .into());
        }

        let message = self
            .append(NewMessage::new(sender, input.to, input.text, kind))
            .await?;

        tracing::debug!(from = %message.from, to = %message.to, kind = %message.kind, "message posted");
        Ok(message)
    }

    /// 写入日志；没有时间的消息使用当前时间。
    pub async fn append(&self, message: NewMessage) -> Result<Message, ApplicationError> {
        let message = message.stamp(self.deps.clock.now());
        Ok(self.deps.message_repository.append(message).await?)
    }

    /// 按写入顺序返回 `requester` 可见的消息，`limit` 保留最新的若干条。
    pub async fn query(
        &self,
        requester: &str,
        limit: Option<MessageLimit>,
    ) -> Result<Vec<Message>, ApplicationError> {
        if requester.trim().is_empty() {
            return Err(DomainError::validation(vec![FieldError::new(
                "user",
                "is required",
            )])
            .into());
        }

        Ok(self
            .deps
            .message_repository
            .visible_to(requester, limit)
            .await?)
    }
}
