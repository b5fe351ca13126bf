mod message_service;
mod participant_service;

pub use message_service::{MessageService, MessageServiceDependencies};
pub use participant_service::{ParticipantService, ParticipantServiceDependencies};
