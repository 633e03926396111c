//! Core protocol types shared by every stage of a request.
//!
//! - [`RequestDescriptor`]: the immutable description of one request attempt
//! - [`ResponseRecord`]: a completed response with its raw body and optional parsed data
//! - [`ClientError`] / [`TransportError`]: the error taxonomy
//! - [`status`]: the bundled status-code-to-reason table

mod request;
pub use request::RequestDescriptor;
pub use request::SUPPORTED_METHODS;

mod response;
pub use response::ResponseRecord;

mod error;
pub use error::BoxError;
pub use error::ClientError;
pub use error::TransportError;

pub mod status;
