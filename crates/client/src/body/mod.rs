//! Response body accumulation.
//!
//! A transport hands the body over as a stream of [`StreamSignal`](crate::transport::StreamSignal)s.
//! [`BodyAccumulator`] buffers the byte chunks and concatenates them once the stream
//! terminates. [`accumulate`] drives a whole signal stream through an accumulator.
//!
//! The body is never decoded to text here. Decoding is up to a content parser or the caller.

mod accumulator;

pub use accumulator::BodyAccumulator;
pub use accumulator::Completion;
pub use accumulator::Termination;
pub use accumulator::accumulate;
