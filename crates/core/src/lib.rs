pub mod config;
pub mod error;
pub mod http;
pub mod templates;
pub mod types;

pub use config::AppConfig;
pub use error::{ZaptosError, ZaptosResult};
pub use types::{Campaign, CampaignSource, CampaignStats, CampaignStatus, Recipient};
