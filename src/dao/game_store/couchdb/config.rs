use super::error::{CouchDaoError, CouchResult};

/// Database name used when `COUCH_DB` is not set.
pub const DEFAULT_DATABASE: &str = "fishbowl";

/// Connection settings for the CouchDB adapter.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server base URL, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding every game document.
    pub database: String,
    /// Basic-auth user, when the server is not in admin-party mode.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
}

impl CouchConfig {
    /// Configuration pointing at the default database on the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: DEFAULT_DATABASE.to_owned(),
            username: None,
            password: None,
        }
    }

    /// Override the target database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Attach basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Read the connection settings from the environment. `COUCH_BASE_URL` is
    /// required; the database and credentials are optional.
    pub fn from_env() -> CouchResult<Self> {
        let base_url =
            std::env::var("COUCH_BASE_URL").map_err(|_| CouchDaoError::MissingEnvVar {
                var: "COUCH_BASE_URL",
            })?;

        let mut config = Self::new(base_url);
        if let Ok(database) = std::env::var("COUCH_DB") {
            config = config.database(database);
        }
        if let (Some(username), Some(password)) = (
            std::env::var("COUCH_USERNAME").ok(),
            std::env::var("COUCH_PASSWORD").ok(),
        ) {
            config = config.with_credentials(username, password);
        }

        Ok(config)
    }
}
