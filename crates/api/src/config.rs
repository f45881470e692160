//! Application configuration

use std::collections::BTreeSet;
use std::env;

/// Hosts allowed when `VALID_HOSTS` is not set
pub const DEFAULT_HOSTS: &[&str] = &[
    "search.ebscohost.com",
    "www.proquest.com",
    "search.proquest.com",
    "link.gale.com",
    "go.gale.com",
];

/// Broker prefix used when no referrer mapping matches
pub const DEFAULT_BROKER_PREFIX: &str =
    "https://go.openathens.net/redirector/OPEN-ATHENS-ID-1.edu";

const DEFAULT_PORT: u16 = 8080;

/// How log records are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// State of the referrer-to-prefix mapping after loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixStatus {
    /// At least one mapping entry was loaded
    Configured,
    /// `OPENATHENS_PREFIXES` unset or an empty object
    Missing,
    /// `OPENATHENS_PREFIXES` could not be parsed; mapping left empty
    Malformed(String),
}

/// Application configuration loaded from environment variables.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub debug: bool,
    pub log_format: LogFormat,
    pub environment: String,
    pub is_production: bool,

    // Allow-lists
    pub valid_hosts: BTreeSet<String>,
    pub valid_referrers: BTreeSet<String>,

    // Broker prefixes (insertion order of the configured JSON object)
    pub broker_prefixes: Vec<(String, String)>,
    pub prefix_status: PrefixStatus,
    /// Mapping keys dropped because their value was not a string
    pub skipped_prefix_keys: Vec<String>,
    pub default_broker_prefix: String,

    // Proxy unwrapping
    pub proxy_domain: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = lookup("APP_ENV");
        let is_production = app_env.as_deref() == Some("production");
        let environment = app_env.unwrap_or_else(|| "production".to_string());

        let proxy_domain = lookup("PROXY_DOMAIN")
            .map(|d| d.trim_matches('/').to_string())
            .unwrap_or_default();

        let mut valid_hosts = match lookup("VALID_HOSTS").filter(|v| !v.is_empty()) {
            Some(raw) => parse_hosts(&raw, is_production),
            None => DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
        };
        if !proxy_domain.is_empty() {
            valid_hosts.insert(proxy_domain.clone());
        }

        let ParsedPrefixes {
            prefixes: broker_prefixes,
            status: prefix_status,
            skipped: skipped_prefix_keys,
        } = parse_prefixes(lookup("OPENATHENS_PREFIXES").as_deref());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            debug: lookup("APP_DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(LogFormat::Json),
            environment,
            is_production,
            valid_hosts,
            valid_referrers: lookup("VALID_REFERRER")
                .map(|raw| split_list(&raw).collect())
                .unwrap_or_default(),
            broker_prefixes,
            prefix_status,
            skipped_prefix_keys,
            default_broker_prefix: lookup("DEFAULT_OPENATHENS_PREFIX")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BROKER_PREFIX.to_string()),
            proxy_domain,
        })
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Emit the startup summary and any prefix-mapping problems
    pub fn log_summary(&self) {
        match &self.prefix_status {
            PrefixStatus::Configured => {}
            PrefixStatus::Missing => tracing::warn!(
                config_status = "missing_prefixes",
                fallback_prefix = %self.default_broker_prefix,
                "No OpenAthens prefixes configured - falling back to default prefix"
            ),
            PrefixStatus::Malformed(message) => tracing::error!(
                error_type = "json_decode_error",
                error_message = %message,
                "Failed to parse OPENATHENS_PREFIXES environment variable"
            ),
        }

        for key in &self.skipped_prefix_keys {
            tracing::warn!(ref_domain = %key, "Skipping non-string OpenAthens prefix");
        }

        tracing::info!(
            port = self.port,
            debug_mode = self.debug,
            environment = %self.environment,
            openathens_prefixes_configured = !self.broker_prefixes.is_empty(),
            valid_hosts = ?self.valid_hosts,
            valid_referrers = ?self.valid_referrers,
            proxy_domain = %self.proxy_domain,
            "Starting URL Proxy service"
        );
    }
}

/// Split a comma-separated list, trimming entries and dropping empties
fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
}

fn parse_hosts(raw: &str, is_production: bool) -> BTreeSet<String> {
    split_list(raw)
        .filter(|host| !(is_production && host.contains("localhost")))
        .collect()
}

struct ParsedPrefixes {
    prefixes: Vec<(String, String)>,
    status: PrefixStatus,
    skipped: Vec<String>,
}

fn parse_prefixes(raw: Option<&str>) -> ParsedPrefixes {
    let malformed = |message: String| ParsedPrefixes {
        prefixes: Vec::new(),
        status: PrefixStatus::Malformed(message),
        skipped: Vec::new(),
    };

    let value: serde_json::Value = match serde_json::from_str(raw.unwrap_or("{}")) {
        Ok(value) => value,
        Err(e) => return malformed(e.to_string()),
    };
    let serde_json::Value::Object(map) = value else {
        return malformed("expected a JSON object".to_string());
    };

    let mut prefixes = Vec::with_capacity(map.len());
    let mut skipped = Vec::new();
    for (referrer, prefix) in map {
        match prefix {
            serde_json::Value::String(prefix) => prefixes.push((referrer, prefix)),
            _ => skipped.push(referrer),
        }
    }

    let status = if prefixes.is_empty() {
        PrefixStatus::Missing
    } else {
        PrefixStatus::Configured
    };
    ParsedPrefixes {
        prefixes,
        status,
        skipped,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert!(!config.is_production);
        assert_eq!(config.environment, "production");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.valid_hosts.len(), DEFAULT_HOSTS.len());
        assert!(config.valid_hosts.contains("search.ebscohost.com"));
        assert!(config.valid_referrers.is_empty());
        assert!(config.broker_prefixes.is_empty());
        assert_eq!(config.prefix_status, PrefixStatus::Missing);
        assert_eq!(config.default_broker_prefix, DEFAULT_BROKER_PREFIX);
        assert_eq!(config.proxy_domain, "");
    }

    #[test]
    fn test_valid_hosts_replace_defaults() {
        let config = config_from(&[("VALID_HOSTS", " a.example.com, ,b.example.com ")]);
        let hosts: Vec<_> = config.valid_hosts.iter().map(String::as_str).collect();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_localhost_dropped_only_in_production() {
        let config = config_from(&[
            ("APP_ENV", "production"),
            ("VALID_HOSTS", "localhost:5000,a.example.com"),
        ]);
        assert!(config.is_production);
        assert!(!config.valid_hosts.contains("localhost:5000"));
        assert!(config.valid_hosts.contains("a.example.com"));

        let config = config_from(&[
            ("APP_ENV", "development"),
            ("VALID_HOSTS", "localhost:5000,a.example.com"),
        ]);
        assert!(!config.is_production);
        assert_eq!(config.environment, "development");
        assert!(config.valid_hosts.contains("localhost:5000"));
    }

    #[test]
    fn test_proxy_domain_is_trimmed_and_allowed() {
        let config = config_from(&[("PROXY_DOMAIN", "/proxy.library.edu/")]);
        assert_eq!(config.proxy_domain, "proxy.library.edu");
        assert!(config.valid_hosts.contains("proxy.library.edu"));
        assert!(config.valid_hosts.contains("go.gale.com"));
    }

    #[test]
    fn test_prefix_mapping_keeps_insertion_order() {
        let config = config_from(&[(
            "OPENATHENS_PREFIXES",
            r#"{"zeta.edu": "https://broker-z/r", "alpha.edu": "https://broker-a/r"}"#,
        )]);
        assert_eq!(config.prefix_status, PrefixStatus::Configured);
        assert_eq!(
            config.broker_prefixes,
            vec![
                ("zeta.edu".to_string(), "https://broker-z/r".to_string()),
                ("alpha.edu".to_string(), "https://broker-a/r".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_prefixes_fall_back_to_empty() {
        let config = config_from(&[("OPENATHENS_PREFIXES", "{not json")]);
        assert!(config.broker_prefixes.is_empty());
        assert!(matches!(config.prefix_status, PrefixStatus::Malformed(_)));

        let config = config_from(&[("OPENATHENS_PREFIXES", r#"["a", "b"]"#)]);
        assert!(config.broker_prefixes.is_empty());
        assert!(matches!(config.prefix_status, PrefixStatus::Malformed(_)));
    }

    #[test]
    fn test_non_string_prefix_values_skipped() {
        let config = config_from(&[(
            "OPENATHENS_PREFIXES",
            r#"{"a.edu": 42, "b.edu": "https://broker-b/r"}"#,
        )]);
        assert_eq!(
            config.broker_prefixes,
            vec![("b.edu".to_string(), "https://broker-b/r".to_string())]
        );
        assert_eq!(config.skipped_prefix_keys, vec!["a.edu".to_string()]);
    }

    #[test]
    fn test_referrers_and_flags() {
        let config = config_from(&[
            ("VALID_REFERRER", "library.university.edu, partnerA.edu,"),
            ("APP_DEBUG", "True"),
            ("LOG_FORMAT", "pretty"),
            ("PORT", "9090"),
            ("DEFAULT_OPENATHENS_PREFIX", "https://broker/default"),
        ]);
        assert_eq!(config.valid_referrers.len(), 2);
        assert!(config.valid_referrers.contains("partnerA.edu"));
        assert!(config.debug);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.port, 9090);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.default_broker_prefix, "https://broker/default");
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("anything-else"), LogFormat::Json);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid("PORT", _))));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("VALID_HOSTS", "env.example.com");
        env::set_var("VALID_REFERRER", "library.university.edu");
        env::remove_var("PORT");

        let config = Config::from_env().unwrap();
        assert!(config.valid_hosts.contains("env.example.com"));
        assert!(config.valid_referrers.contains("library.university.edu"));
        assert_eq!(config.port, 8080);

        env::remove_var("VALID_HOSTS");
        env::remove_var("VALID_REFERRER");
    }
}
