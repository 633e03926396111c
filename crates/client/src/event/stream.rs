use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures::channel::mpsc::UnboundedReceiver;
use pin_project_lite::pin_project;
use tokio::task::{JoinError, JoinHandle};

use crate::event::Event;
use crate::orchestrator::Outcome;

pin_project! {
    /// The events of a spawned request, in emission order.
    ///
    /// The stream ends once the request reached its terminal outcome, which can then be
    /// obtained with [`EventStream::outcome`].
    #[derive(Debug)]
    pub struct EventStream {
        #[pin]
        receiver: UnboundedReceiver<Event>,
        task: JoinHandle<Outcome>,
    }
}

impl EventStream {
    pub(crate) fn new(receiver: UnboundedReceiver<Event>, task: JoinHandle<Outcome>) -> Self {
        Self { receiver, task }
    }

    /// Waits for the request to finish and returns its outcome.
    pub async fn outcome(self) -> Result<Outcome, JoinError> {
        self.task.await
    }

    /// Aborts the request. Events already emitted stay readable.
    ///
    /// The task is dropped, so no `error` event follows and the stream simply ends.
    /// [`EventStream::outcome`] then returns a cancelled [`JoinError`].
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().receiver.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.receiver.size_hint()
    }
}
