//! shiroha-adapter-keycloak - Keycloak identity provider adapter
//!
//! Implements [`shiroha_ports::IdentityProvider`] over the Keycloak REST API:
//! - OpenID Connect token, userinfo, logout and introspection endpoints
//! - Admin API user, role-mapping and group endpoints
//! - HTTP status mapping to `AppError`

pub mod client;
pub mod config;
pub mod error;

pub use client::KeycloakClient;
pub use config::{KeycloakConfig, KeycloakConfigBuilder};
pub use error::map_keycloak_status;
