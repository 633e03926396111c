use std::fmt;
use std::sync::Arc;

use futures::channel::mpsc;
use tracing::warn;

use crate::client::Client;
use crate::event::{Event, EventEmitter, EventFilter, EventSink, EventStream};
use crate::orchestrator::Outcome;
use crate::protocol::{ClientError, RequestDescriptor};

/// One logical request, not yet issued.
///
/// Listeners registered with [`on`](RequestHandle::on) receive the events of every hop
/// of the request, redirects included. Nothing happens until the handle is driven with
/// [`send`](RequestHandle::send), [`dispatch`](RequestHandle::dispatch) or
/// [`spawn`](RequestHandle::spawn).
pub struct RequestHandle {
    client: Client,
    request: Result<RequestDescriptor, Arc<ClientError>>,
    emitter: EventEmitter,
}

impl RequestHandle {
    pub(crate) fn new(client: Client, request: Result<RequestDescriptor, Arc<ClientError>>) -> Self {
        Self { client, request, emitter: EventEmitter::new() }
    }

    /// Subscribes `listener` to the events selected by `filter`.
    ///
    /// ```ignore
    /// client.get(url, RequestOptions::new())
    ///     .on("404", |_| println!("not there"))
    ///     .on("success", |event| println!("{:?}", event.payload()))
    ///     .send()
    ///     .await;
    /// ```
    pub fn on<F>(mut self, filter: impl Into<EventFilter>, listener: F) -> Self
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.emitter.on(filter, listener);
        self
    }

    /// The request about to be issued, `None` if it was rejected already.
    pub fn descriptor(&self) -> Option<&RequestDescriptor> {
        self.request.as_ref().ok()
    }

    /// Drives the request to its terminal outcome, notifying the registered listeners.
    pub async fn send(self) -> Outcome {
        let Self { client, request, mut emitter } = self;
        drive(&client, request, &mut emitter).await
    }

    /// Like [`send`](RequestHandle::send), every event is also emitted into `sink`.
    pub async fn dispatch(self, sink: &mut dyn EventSink) -> Outcome {
        let Self { client, request, emitter } = self;
        let mut tee = Tee { emitter, sink };
        drive(&client, request, &mut tee).await
    }

    /// Runs the request on the tokio runtime and streams its events.
    ///
    /// Registered listeners are still invoked, from the spawned task.
    pub fn spawn(self) -> EventStream {
        let Self { client, request, mut emitter } = self;
        let (sender, receiver) = mpsc::unbounded();
        emitter.forward_to(sender);

        let task = tokio::spawn(async move { drive(&client, request, &mut emitter).await });
        EventStream::new(receiver, task)
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle").field("request", &self.request).field("listeners", &self.emitter.listener_count()).finish()
    }
}

async fn drive(client: &Client, request: Result<RequestDescriptor, Arc<ClientError>>, sink: &mut dyn EventSink) -> Outcome {
    match request {
        Ok(request) => client.inner.orchestrator.run(request, sink).await,
        Err(error) => {
            warn!(cause = %error, "request rejected before it was issued");
            sink.emit(Event::error(Arc::clone(&error)));
            Err(error)
        }
    }
}

struct Tee<'a> {
    emitter: EventEmitter,
    sink: &'a mut dyn EventSink,
}

impl EventSink for Tee<'_> {
    fn emit(&mut self, event: Event) {
        self.emitter.emit(event.clone());
        self.sink.emit(event);
    }
}
