use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::channel::mpsc::UnboundedSender;
use serde_json::Value;
use tracing::trace;

use crate::event::{EventFilter, EventKind};
use crate::protocol::{ClientError, ResponseRecord};

/// A single notification delivered to listeners.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Response(Arc<ResponseRecord>),
    Failure(Arc<ClientError>),
}

/// The data an event carries.
///
/// Status events carry the parsed data when a content parser succeeded, otherwise the raw body.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Parsed(&'a Value),
    Body(&'a Bytes),
    Error(&'a ClientError),
}

impl Event {
    pub(crate) fn response(kind: EventKind, response: Arc<ResponseRecord>) -> Self {
        Self { kind, source: Source::Response(response) }
    }

    pub(crate) fn error(error: Arc<ClientError>) -> Self {
        Self { kind: EventKind::Error, source: Source::Failure(error) }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn payload(&self) -> Payload<'_> {
        match &self.source {
            Source::Response(response) => match response.parsed() {
                Some(parsed) => Payload::Parsed(parsed),
                None => Payload::Body(response.raw_body()),
            },
            Source::Failure(error) => Payload::Error(error),
        }
    }

    /// The response record, absent for `error` events.
    pub fn response_record(&self) -> Option<&Arc<ResponseRecord>> {
        match &self.source {
            Source::Response(response) => Some(response),
            Source::Failure(_) => None,
        }
    }

    pub fn client_error(&self) -> Option<&Arc<ClientError>> {
        match &self.source {
            Source::Response(_) => None,
            Source::Failure(error) => Some(error),
        }
    }
}

/// Receives the events of one logical request, across every redirect hop.
pub trait EventSink: Send {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl EventSink for UnboundedSender<Event> {
    fn emit(&mut self, event: Event) {
        if let Err(e) = self.unbounded_send(event) {
            trace!(event = %e.into_inner().kind(), "event receiver is gone, notification dropped");
        }
    }
}

type Listener = Box<dyn FnMut(&Event) + Send>;

/// A registry of listeners, invoked synchronously in registration order.
///
/// An event nobody listens to is dropped silently, which is only visible in `trace` logs.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<(EventFilter, Listener)>,
    forward: Option<UnboundedSender<Event>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener to the events selected by `filter`.
    pub fn on<F>(&mut self, filter: impl Into<EventFilter>, listener: F) -> &mut Self
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.listeners.push((filter.into(), Box::new(listener)));
        self
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Additionally forwards every event into a channel.
    pub(crate) fn forward_to(&mut self, sender: UnboundedSender<Event>) {
        self.forward = Some(sender);
    }
}

impl EventSink for EventEmitter {
    fn emit(&mut self, event: Event) {
        let mut delivered = 0_usize;
        for (filter, listener) in &mut self.listeners {
            if filter.matches(event.kind()) {
                listener(&event);
                delivered += 1;
            }
        }

        if let Some(sender) = &self.forward
            && sender.unbounded_send(event.clone()).is_ok()
        {
            delivered += 1;
        }

        if delivered == 0 {
            trace!(event = %event.kind(), "no listener for event, notification dropped");
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.iter().map(|(filter, _)| filter).collect::<Vec<_>>())
            .field("forward", &self.forward.is_some())
            .finish()
    }
}
