//! Statement flattening: raw allow statements into atomic grants

pub mod arn;
pub mod flatten;

pub use arn::{service_from_arn, split_action};
pub use flatten::{flatten, flatten_documents};
