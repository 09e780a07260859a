use serde::Serialize;

use crate::{error::XmlError, xml};

/// The part of the server's stats reply the form needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    /// Path of the configuration file on the server.
    pub config_path: String,
    /// Whether the server accepts configuration updates.
    pub writable: bool,
}

impl ServerStats {
    pub fn parse(document: &str) -> Result<Self, XmlError> {
        let root = xml::parse(document)?;
        let config_path = root
            .find("config_path")
            .map(|e| e.text().trim().to_string())
            .unwrap_or_default();
        let writable = match root.find("writable_config") {
            Some(e) => e.text().trim() == "1",
            None => {
                warn!("stats reply has no writable_config, assuming read-only");
                false
            }
        };
        Ok(ServerStats {
            config_path,
            writable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats() {
        let stats = ServerStats::parse(
            "<status><service_status><config_path>/etc/mt-daapd.conf</config_path>\
             <writable_config>1</writable_config></service_status></status>",
        )
        .unwrap();
        assert_eq!(stats.config_path, "/etc/mt-daapd.conf");
        assert!(stats.writable);
    }

    #[test]
    fn test_missing_flag_is_read_only() {
        let stats = ServerStats::parse("<status><config_path>x</config_path></status>").unwrap();
        assert!(!stats.writable);
    }
}
