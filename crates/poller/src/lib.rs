pub mod auth;
pub mod cursor;
pub mod fetcher;
pub mod scheduler;

pub use auth::{ClientCredentials, CredentialSource};
pub use cursor::Cursor;
pub use fetcher::FeedFetcher;
pub use scheduler::{FetchCycle, Scheduler};
