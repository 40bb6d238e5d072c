//! Event bus port — how entity changes reach subscribers.

use std::future::Future;
use std::sync::Arc;

use melhub_domain::error::HubError;
use melhub_domain::event::Event;

/// Publishes domain events to interested subscribers.
///
/// Implementations must not block: publishing happens on the command path of
/// integrations.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).publish(event)
    }
}
