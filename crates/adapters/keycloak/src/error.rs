//! Error mapping for Keycloak adapter

use shiroha_errors::AppError;

/// Convert a non-success Keycloak HTTP status to AppError
pub fn map_keycloak_status(status: u16, context: &str, body: &str) -> AppError {
    let message = format!("{}: {} {}", context, status, body);

    match status {
        400 => AppError::failed_precondition(message),
        401 => AppError::unauthenticated(message),
        403 => AppError::forbidden(message),
        404 => AppError::not_found(message),
        409 => AppError::conflict(message),
        _ => AppError::external_service(message),
    }
}

/// Convert a transport-level reqwest error to AppError
pub fn map_transport_error(err: reqwest::Error, context: &str) -> AppError {
    match err.status() {
        Some(status) => map_keycloak_status(status.as_u16(), context, &err.to_string()),
        None => AppError::external_service(format!("{}: {}", context, err)),
    }
}
