//! Session configuration, parsed from a JSON file the way the teacher's
//! `NetworkConfig::new` reads its peer list -- here it describes the
//! coordinator's listen address, the agents' dial address, and optional
//! knobs (IP allow-list, timeouts) that are part of the session lifecycle
//! rather than the wire protocol itself.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::MpcError;

#[derive(Debug, Deserialize)]
struct RawConfig {
    listen_addr: String,
    #[serde(default)]
    allowed_ips: Vec<String>,
    #[serde(default)]
    read_timeout_ms: Option<u64>,
}

/// Coordinator-side session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub listen_addr: SocketAddr,
    /// Empty means "accept from any IP" -- allow-listing is disabled.
    pub allowed_ips: Vec<IpAddr>,
    pub read_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn from_file(path: &Path) -> Result<Self, MpcError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, MpcError> {
        let raw: RawConfig = serde_json::from_str(contents)
            .map_err(|e| MpcError::Domain(format!("invalid session config: {e}")))?;

        let listen_addr = raw
            .listen_addr
            .parse()
            .map_err(|e| MpcError::Domain(format!("invalid listen_addr: {e}")))?;

        let mut allowed_ips = Vec::with_capacity(raw.allowed_ips.len());
        for ip in raw.allowed_ips {
            let parsed: IpAddr = ip
                .parse()
                .map_err(|e| MpcError::Domain(format!("invalid allowed_ips entry {ip:?}: {e}")))?;
            allowed_ips.push(parsed);
        }

        Ok(Self {
            listen_addr,
            allowed_ips,
            read_timeout: raw.read_timeout_ms.map(Duration::from_millis),
        })
    }

    /// Whether `ip` is allowed to JOIN. An empty allow-list means everyone is
    /// allowed (the allow-list feature is disabled).
    pub fn permits(&self, ip: IpAddr) -> bool {
        self.allowed_ips.is_empty() || self.allowed_ips.contains(&ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let json = r#"{ "listen_addr": "127.0.0.1:9000" }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert!(config.allowed_ips.is_empty());
        assert!(config.read_timeout.is_none());
    }

    #[test]
    fn empty_allow_list_permits_everyone() {
        let config = SessionConfig::from_json(r#"{ "listen_addr": "0.0.0.0:9000" }"#).unwrap();
        assert!(config.permits("203.0.113.4".parse().unwrap()));
    }

    #[test]
    fn nonempty_allow_list_rejects_unknown_ips() {
        let json = r#"{
            "listen_addr": "0.0.0.0:9000",
            "allowed_ips": ["10.0.0.1", "10.0.0.2"]
        }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert!(config.permits("10.0.0.1".parse().unwrap()));
        assert!(!config.permits("10.0.0.9".parse().unwrap()));
    }

    #[test]
    fn rejects_malformed_listen_addr() {
        let json = r#"{ "listen_addr": "not-an-address" }"#;
        assert!(SessionConfig::from_json(json).is_err());
    }

    #[test]
    fn reads_timeout_in_milliseconds() {
        let json = r#"{ "listen_addr": "127.0.0.1:9000", "read_timeout_ms": 2500 }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.read_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn loads_from_an_actual_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{ "listen_addr": "127.0.0.1:9001" }"#).unwrap();
        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.listen_addr.port(), 9001);
    }
}
