use std::sync::Arc;

use domain::{
    message::JOINED_TEXT, DomainError, MessageRepository, NewMessage, Participant,
    ParticipantName, ParticipantRepository, RepositoryError,
};

use crate::{
    clock::Clock,
    error::ApplicationError,
    validation::{validate_input, RegisterParticipantInput},
};

pub struct ParticipantServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct ParticipantService {
    deps: ParticipantServiceDependencies,
}

impl ParticipantService {
    pub fn new(deps: ParticipantServiceDependencies) -> Self {
        Self { deps }
    }

    /// 注册在线身份并广播“加入”通知。同名参与者在线时返回冲突，不刷新。
    pub async fn register(
        &self,
        input: RegisterParticipantInput,
    ) -> Result<Participant, ApplicationError> {
        validate_input(&input)?;
        let name = ParticipantName::parse(input.name)?;

        let now = self.deps.clock.now();
        let participant = self
            .deps
            .participant_repository
            .insert(Participant::new(name.clone(), now))
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationError::Domain(DomainError::participant_already_exists(name.as_str()))
                }
                other => other.into(),
            })?;

        // 加入通知写入失败时撤销注册，客户端可以直接重试
        if let Err(err) = self
            .deps
            .message_repository
            .append(NewMessage::status(name.as_str(), JOINED_TEXT).stamp(now))
            .await
        {
            if let Err(rollback_err) = self
                .deps
                .participant_repository
                .remove(name.as_str())
                .await
            {
                tracing::error!(
                    participant = %name,
                    error = %rollback_err,
                    "failed to roll back registration"
                );
            }
            tracing::error!(participant = %name, error = %err, "failed to append join notice");
            return Err(err.into());
        }

        tracing::info!(participant = %participant.name, "participant joined");
        Ok(participant)
    }

    /// 刷新心跳。参与者已被清理时返回未找到。
    pub async fn heartbeat(&self, name: &str) -> Result<Participant, ApplicationError> {
        let now = self.deps.clock.now();
        let participant = self
            .deps
            .participant_repository
            .touch(name, now)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    ApplicationError::Domain(DomainError::participant_not_found(name))
                }
                other => other.into(),
            })?;

        tracing::debug!(participant = %participant.name, "heartbeat");
        Ok(participant)
    }

    pub async fn list(&self) -> Result<Vec<Participant>, ApplicationError> {
        Ok(self.deps.participant_repository.list().await?)
    }
}
