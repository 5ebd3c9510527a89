use serde::{Deserialize, Serialize};

/// Connection parameters for a MongoDB deployment.
///
/// `service` is the host (optionally `host:port`) of the server. Credentials
/// are only used when both halves of the pair are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MongoSettings {
    pub service: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl MongoSettings {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Build the `mongodb://` connection string.
    ///
    /// The port is appended only when the service address does not already
    /// carry one.
    pub fn connection_string(&self) -> String {
        let host = match self.port {
            Some(port) if !self.service_has_port() => format!("{}:{port}", self.service),
            _ => self.service.clone(),
        };

        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => format!(
                "mongodb://{}:{}@{host}",
                urlencoding::encode(user),
                urlencoding::encode(pass)
            ),
            _ => format!("mongodb://{host}"),
        }
    }

    /// True when `service` ends in `:<digits>`, ignoring colons inside a
    /// bracketed IPv6 literal such as `[::1]`.
    fn service_has_port(&self) -> bool {
        let tail = match self.service.rfind(']') {
            Some(bracket) => &self.service[bracket + 1..],
            None => self.service.as_str(),
        };
        tail.rsplit_once(':')
            .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Connection string with the password masked, safe for logs.
    pub fn redacted(&self) -> String {
        match (&self.username, &self.password) {
            (Some(_), Some(pass)) if !pass.is_empty() => self
                .connection_string()
                .replace(urlencoding::encode(pass).as_ref(), "****"),
            _ => self.connection_string(),
        }
    }
}
