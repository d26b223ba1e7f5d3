//! 应用层

pub mod auth_service;
pub mod challenge_service;
pub mod game_service;
pub mod listing;
pub mod page_cache;

pub use auth_service::{AuthService, AuthSettings, LoginOutcome, RegisterCommand};
pub use challenge_service::ChallengeService;
pub use game_service::GameService;
pub use listing::{GameListing, GamePage};
pub use page_cache::PageCache;
