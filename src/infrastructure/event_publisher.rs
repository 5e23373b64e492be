use crate::domain::lock::DayLockedEvent;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[async_trait]
pub trait DayLockedPublisher: Send + Sync {
    async fn publish(&self, event: DayLockedEvent) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct ChannelDayLockedPublisher {
    sender: mpsc::Sender<DayLockedEvent>,
}

impl ChannelDayLockedPublisher {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DayLockedEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl DayLockedPublisher for ChannelDayLockedPublisher {
    async fn publish(&self, event: DayLockedEvent) -> Result<(), InfraError> {
        self.sender
            .send(event)
            .await
            .map_err(|error| InfraError::Publish(format!("day locked receiver closed: {error}")))
    }
}
