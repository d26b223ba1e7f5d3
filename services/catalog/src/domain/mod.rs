//! 领域层

pub mod challenge;
pub mod game;
pub mod repository;

pub use challenge::{Challenge, ChallengeAnswer, ChallengeKind, ChallengeRenderer};
pub use game::{Game, GameId, GameInput};
pub use repository::GameRepository;
