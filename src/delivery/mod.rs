//! Returning recordings to chat channels.

mod service;
mod transport;

pub use service::{DeliveryOutcome, DeliveryService, DEFAULT_MAX_UPLOAD_BYTES};
pub use transport::{ChatTransport, TextFormat};

#[cfg(test)]
pub(crate) use transport::testing;
