//! Keycloak configuration

use secrecy::Secret;

/// Keycloak client configuration
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Keycloak server base URL
    pub base_url: String,

    /// Realm holding the administrative client
    pub admin_realm: String,

    /// Realm holding end users
    pub client_realm: String,

    /// Administrative client (client-credentials grant)
    pub admin_client_id: String,
    pub admin_client_secret: Secret<String>,

    /// End-user facing client (password and refresh grants)
    pub client_id: String,
    pub client_secret: Secret<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for KeycloakConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            admin_realm: "master".to_string(),
            client_realm: "master".to_string(),
            admin_client_id: "admin-cli".to_string(),
            admin_client_secret: Secret::new(String::new()),
            client_id: String::new(),
            client_secret: Secret::new(String::new()),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Builder for KeycloakConfig
pub struct KeycloakConfigBuilder {
    config: KeycloakConfig,
}

impl KeycloakConfigBuilder {
    /// Create a new builder with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: KeycloakConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
        }
    }

    /// Set the admin and client realms
    pub fn with_realms(
        mut self,
        admin_realm: impl Into<String>,
        client_realm: impl Into<String>,
    ) -> Self {
        self.config.admin_realm = admin_realm.into();
        self.config.client_realm = client_realm.into();
        self
    }

    /// Set administrative client credentials
    pub fn with_admin_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.config.admin_client_id = client_id.into();
        self.config.admin_client_secret = Secret::new(client_secret.into());
        self
    }

    /// Set end-user client credentials
    pub fn with_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.config.client_id = client_id.into();
        self.config.client_secret = Secret::new(client_secret.into());
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout_secs: u64) -> Self {
        self.config.request_timeout_secs = timeout_secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> KeycloakConfig {
        self.config
    }
}
