pub mod affiliate;
pub mod api;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fortune;
pub mod llm;
pub mod product;
pub mod quote;
pub mod zodiac;

pub use config::AppConfig;
pub use fortune::{FortuneRequest, FortuneResult, FortuneService};
