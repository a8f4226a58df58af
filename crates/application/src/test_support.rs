//! 测试基座：内存仓库 + 可手动拨动的时钟。

use std::sync::{Arc, Mutex};

use chrono::Duration;
use domain::Timestamp;

use crate::clock::Clock;
use crate::repository::memory::{MemoryMessageRepository, MemoryParticipantRepository};
use crate::services::{
    MessageService, MessageServiceDependencies, ParticipantService,
    ParticipantServiceDependencies,
};

/// 测试专用时钟，手动推进。
pub(crate) struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub(crate) fn starting_at(at: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(at),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

pub(crate) struct TestBackend {
    pub participants: Arc<MemoryParticipantRepository>,
    pub messages: Arc<MemoryMessageRepository>,
    pub clock: Arc<ManualClock>,
    pub participant_service: Arc<ParticipantService>,
    pub message_service: Arc<MessageService>,
}

pub(crate) fn backend() -> TestBackend {
    let participants = Arc::new(MemoryParticipantRepository::new());
    let messages = Arc::new(MemoryMessageRepository::new());
    let clock = ManualClock::starting_at(chrono::Utc::now());

    let participant_service = Arc::new(ParticipantService::new(ParticipantServiceDependencies {
        participant_repository: participants.clone(),
        message_repository: messages.clone(),
        clock: clock.clone(),
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        message_repository: messages.clone(),
        participant_repository: participants.clone(),
        clock: clock.clone(),
    }));

    TestBackend {
        participants,
        messages,
        clock,
        participant_service,
        message_service,
    }
}
