use std::net::{IpAddr, SocketAddr};

use anyhow::Context;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
}

impl Config {
    /// Reads `HOST` and `PORT` from the environment (after `.env`, if any).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::var("HOST").ok(), std::env::var("PORT").ok())
    }

    pub fn from_vars(host: Option<String>, port: Option<String>) -> anyhow::Result<Self> {
        let host = host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = port.unwrap_or_else(|| DEFAULT_PORT.to_string());
        let ip: IpAddr = host.parse().with_context(|| format!("invalid HOST `{host}`"))?;
        let port: u16 = port.parse().with_context(|| format!("invalid PORT `{port}`"))?;
        Ok(Self { addr: SocketAddr::new(ip, port) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_localhost_8080() {
        let config = Config::from_vars(None, None).unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn rejects_bad_port() {
        let err = Config::from_vars(None, Some("http".into())).unwrap_err();
        assert!(err.to_string().contains("invalid PORT"));
    }

    #[test]
    fn accepts_explicit_host_and_port() {
        let config = Config::from_vars(Some("0.0.0.0".into()), Some("3000".into())).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
    }
}
