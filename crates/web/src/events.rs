//! Fan-out of committed match transitions to Server-Sent Events subscribers.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storage::services::match_state::MatchEvent;
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchNotification {
    pub match_id: Uuid,
    #[serde(flatten)]
    pub event: MatchEvent,
    pub emitted_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct MatchEvents {
    sender: broadcast::Sender<MatchNotification>,
}

impl MatchEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes events of a committed transition. Having no subscribers is not an error.
    pub fn publish(&self, match_id: Uuid, events: &[MatchEvent]) {
        let emitted_at = Utc::now();
        for event in events {
            let notification = MatchNotification {
                match_id,
                event: *event,
                emitted_at,
            };
            if self.sender.send(notification).is_err() {
                tracing::debug!(%match_id, event = event.name(), "No match event subscribers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchNotification> {
        self.sender.subscribe()
    }
}

fn to_sse(
    item: Result<MatchNotification, BroadcastStreamRecvError>,
) -> Option<Result<Event, Infallible>> {
    match item {
        Ok(notification) => match Event::default()
            .event(notification.event.name())
            .json_data(&notification)
        {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("Failed to encode match event: {}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Match event subscriber lagged behind");
            None
        }
    }
}

fn notification_stream(
    events: &MatchEvents,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static + use<> {
    BroadcastStream::new(events.subscribe()).filter_map(to_sse)
}

#[utoipa::path(
    get,
    path = "/api/matches/events",
    responses(
        (status = 200, description = "Server-Sent Events stream of match_updated, timeout_requested and timeout_ended", content_type = "text/event-stream", body = MatchNotification)
    ),
    tag = "matches"
)]
pub async fn stream_match_events(
    State(events): State<MatchEvents>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(notification_stream(&events)).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use storage::services::set_rules::Side;

    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let events = MatchEvents::new(8);
        let mut rx = events.subscribe();
        let match_id = Uuid::new_v4();

        events.publish(
            match_id,
            &[
                MatchEvent::TimeoutEnded,
                MatchEvent::TimeoutRequested { side: Side::Local },
            ],
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.match_id, match_id);
        assert_eq!(first.event, MatchEvent::TimeoutEnded);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event, MatchEvent::TimeoutRequested { side: Side::Local });
    }

    #[test]
    fn test_publish_without_subscribers() {
        MatchEvents::new(1).publish(Uuid::new_v4(), &[MatchEvent::MatchUpdated]);
    }

    #[test]
    fn test_notification_json_shape() {
        let notification = MatchNotification {
            match_id: Uuid::nil(),
            event: MatchEvent::TimeoutRequested { side: Side::Visitor },
            emitted_at: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "timeout_requested");
        assert_eq!(json["side"], "visitor");
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_missed_events() {
        let events = MatchEvents::new(1);
        let mut stream = Box::pin(BroadcastStream::new(events.subscribe()).filter_map(to_sse));

        let match_id = Uuid::new_v4();
        events.publish(match_id, &[MatchEvent::MatchUpdated, MatchEvent::TimeoutEnded]);

        assert!(stream.next().await.is_some());
    }
}
