//! 持久化

mod migrations;
mod postgres_game_repository;

pub use migrations::catalog_migrations;
pub use postgres_game_repository::PostgresGameRepository;
