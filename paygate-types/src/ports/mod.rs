//! Port traits (interfaces for adapters).
//!
//! The client depends on these traits, not on concrete implementations.

mod transport;

pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
