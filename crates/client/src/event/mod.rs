//! Event delivery.
//!
//! Every completed response is turned into a cascade of events, see
//! [`classify`](crate::classify::classify). Consumers subscribe at the granularity they
//! need: an exact code (`"404"`), a class (`"4XX"`), a reason name (`"not-found"`), a
//! category (`"success"`, `"redirect"`, `"http-error"`, `"http-client-error"`,
//! `"http-server-error"`), `"complete"` or `"error"`.
//!
//! - [`EventEmitter`]: a listener registry, one per logical request
//! - [`EventSink`]: anything events can be emitted into
//! - [`EventStream`]: the events of a spawned request as a [`futures::Stream`]

mod emitter;
mod kind;
mod stream;

pub use emitter::Event;
pub use emitter::EventEmitter;
pub use emitter::EventSink;
pub use emitter::Payload;
pub use kind::EventFilter;
pub use kind::EventKind;
pub use kind::StatusClass;
pub use stream::EventStream;
