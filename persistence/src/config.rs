use std::fmt;

use crate::error::{Error, Result};

/// Where the ssh server is and which address the tunnel forwards to
#[derive(Clone)]
pub struct TunnelConfig {
    pub ssh_host: String,
    pub ssh_port: u16,
    pub username: String,
    pub password: String,
    /// mongodb address as seen from the ssh server
    pub remote_host: String,
    pub remote_port: u16,
}

impl fmt::Debug for TunnelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelConfig")
            .field("ssh_host", &self.ssh_host)
            .field("ssh_port", &self.ssh_port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("remote_host", &self.remote_host)
            .field("remote_port", &self.remote_port)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database: String,
    pub tunnel: TunnelConfig,
}

impl DbConfig {
    /// Read the configuration from `MONGO_*` and `SERVER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| lookup(key).ok_or(Error::MissingVar(key));
        let port = |key: &'static str| {
            let value = var(key)?;
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::InvalidVar(key, value))
        };
        Ok(Self {
            database: var("MONGO_DB")?,
            tunnel: TunnelConfig {
                ssh_host: var("SERVER_HOST_NAME")?,
                ssh_port: port("SERVER_HOST_PORT")?,
                username: var("SERVER_USERNAME")?,
                password: var("SERVER_PASSWORD")?,
                remote_host: var("MONGO_HOST")?,
                remote_port: port("MONGO_PORT")?,
            },
        })
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn env() -> HashMap<&'static str, String> {
        [
            ("MONGO_HOST", "127.0.0.1"),
            ("MONGO_PORT", "27017"),
            ("MONGO_DB", "vacancies"),
            ("SERVER_HOST_NAME", "db.example.org"),
            ("SERVER_HOST_PORT", "22"),
            ("SERVER_USERNAME", "scraper"),
            ("SERVER_PASSWORD", "hunter2"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_owned()))
        .collect()
    }

    #[test]
    fn test_from_lookup() {
        let env = env();
        let config = DbConfig::from_lookup(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.database, "vacancies");
        assert_eq!(config.tunnel.ssh_port, 22);
        assert_eq!(config.tunnel.remote_host, "127.0.0.1");
        assert_eq!(config.tunnel.remote_port, 27017);
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_missing_variable() {
        let mut env = env();
        env.remove("SERVER_PASSWORD");
        let err = DbConfig::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, Error::MissingVar("SERVER_PASSWORD")));
    }

    #[test]
    fn test_invalid_port() {
        let mut env = env();
        env.insert("MONGO_PORT", "mongo".to_owned());
        let err = DbConfig::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, Error::InvalidVar("MONGO_PORT", _)));
    }
}
