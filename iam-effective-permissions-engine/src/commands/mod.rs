//! Commands module - service layer for effective permission evaluation

mod evaluate;
pub(crate) mod service;

pub use evaluate::summarize_documents;
pub use service::EffectivePermissionsService;
