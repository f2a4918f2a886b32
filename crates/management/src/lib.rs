//! Campaign orchestration: persisted campaign records, recipient resolution
//! and the sequential send loop that drives a campaign run.
//!
//! Campaign records live in one JSON document on local disk; see
//! [`store::JsonFileStore`] for the single-writer caveat.

pub mod campaigns;
pub mod executor;
pub mod resolver;
pub mod store;

pub use campaigns::{CampaignManager, NewCampaign};
pub use executor::CampaignExecutor;
pub use resolver::RecipientResolver;
pub use store::{CampaignMap, CampaignStore, JsonFileStore};
