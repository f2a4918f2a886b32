//! CRM integration (GoHighLevel) used as an alternate recipient source and for
//! contact sync.

pub mod adapters;
pub mod client;
pub mod types;

pub use adapters::{CrmAdapter, GhlAdapter};
pub use client::{ContactSource, GhlClient};
pub use types::CrmContact;
