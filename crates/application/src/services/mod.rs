mod message_service;
mod participant_service;

#[cfg(test)]
mod message_service_tests;

pub use message_service::{
    MessageService, MessageServiceDependencies, PostMessageRequest, DEPARTURE_NOTICE,
};
pub use participant_service::{
    JoinRequest, JoinedParticipant, ParticipantService, ParticipantServiceDependencies,
    ENTER_NOTICE,
};
