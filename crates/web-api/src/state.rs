use std::sync::Arc;

use application::{
    Clock, MessageService, MessageServiceDependencies, ParticipantService,
    ParticipantServiceDependencies,
};
use domain::{MessageRepository, ParticipantRepository};

#[derive(Clone)]
pub struct AppState {
    pub participant_service: Arc<ParticipantService>,
    pub message_service: Arc<MessageService>,
}

impl AppState {
    /// 两个服务共享同一组存储实例与时钟
    pub fn new(
        participant_repository: Arc<dyn ParticipantRepository>,
        message_repository: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let participant_service = ParticipantService::new(ParticipantServiceDependencies {
            participant_repository: participant_repository.clone(),
            message_repository: message_repository.clone(),
            clock: clock.clone(),
        });
        let message_service = MessageService::new(MessageServiceDependencies {
            participant_repository,
            message_repository,
            clock,
        });

        Self {
            participant_service: Arc::new(participant_service),
            message_service: Arc::new(message_service),
        }
    }
}
