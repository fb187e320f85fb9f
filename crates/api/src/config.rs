use axum::http::HeaderValue;

/// Errors raised while reading configuration. Startup aborts on any of them.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("DATABASE_URL must be set unless USE_IN_MEMORY=true")]
    MissingDatabaseUrl,
}

/// Which todo store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Transient store, lost on restart.
    InMemory,
    /// PostgreSQL reached through a connection pool.
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Origins allowed to make cross-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<OriginPattern>),
}

/// One entry of the CORS allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
    /// Matched byte for byte against the `Origin` header.
    Exact(HeaderValue),
    /// `https://*.example.com`: any subdomain of `example.com` over `https`.
    Subdomains {
        /// Everything up to and including `://`.
        scheme_prefix: String,
        /// Host suffix including the leading dot, e.g. `.example.com`.
        host_suffix: String,
    },
}

impl OriginPattern {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::Invalid {
            name: "CORS_ORIGINS",
            expected: "a comma-separated list of origins",
            value: raw.to_string(),
        };

        if let Some((scheme, host)) = raw.split_once("://*.") {
            if scheme.is_empty() || host.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Subdomains {
                scheme_prefix: format!("{scheme}://"),
                host_suffix: format!(".{host}"),
            });
        }

        HeaderValue::from_str(raw)
            .map(Self::Exact)
            .map_err(|_| invalid())
    }

    /// Whether an `Origin` header value is allowed by this entry.
    pub fn matches(&self, origin: &HeaderValue) -> bool {
        match self {
            Self::Exact(allowed) => allowed == origin,
            Self::Subdomains {
                scheme_prefix,
                host_suffix,
            } => {
                let Ok(origin) = origin.to_str() else {
                    return false;
                };
                origin
                    .strip_prefix(scheme_prefix.as_str())
                    .is_some_and(|host| {
                        host.len() > host_suffix.len() && host.ends_with(host_suffix.as_str())
                    })
            }
        }
    }
}

impl CorsOrigins {
    /// Parse the comma-separated `CORS_ORIGINS` value.
    ///
    /// An empty list or a `*` entry allows any origin.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let entries: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if entries.is_empty() || entries.contains(&"*") {
            return Ok(Self::Any);
        }

        entries
            .into_iter()
            .map(OriginPattern::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: CorsOrigins,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Prefix every route is mounted under, e.g. `/todo-app` (default: none).
    pub path_base: Option<String>,
    pub store: StoreBackend,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `*`                        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PATH_BASE`            | (none)                     |
    /// | `USE_IN_MEMORY`        | `false`                    |
    /// | `DATABASE_URL`         | required for PostgreSQL    |
    /// | `DB_MAX_CONNECTIONS`   | `20`                       |
    /// | `LOG_FORMAT`           | `pretty`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = parse_var("PORT", "a valid u16", var("PORT", "3000"))?;
        let cors_origins = CorsOrigins::parse(&var("CORS_ORIGINS", "*"))?;
        let request_timeout_secs = parse_var(
            "REQUEST_TIMEOUT_SECS",
            "a valid u64",
            var("REQUEST_TIMEOUT_SECS", "30"),
        )?;
        let path_base = normalize_path_base(&var("PATH_BASE", ""));

        let use_in_memory = parse_var(
            "USE_IN_MEMORY",
            "true or false",
            var("USE_IN_MEMORY", "false").to_ascii_lowercase(),
        )?;
        let store = if use_in_memory {
            StoreBackend::InMemory
        } else {
            let database_url = lookup("DATABASE_URL")
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            let max_connections = parse_var(
                "DB_MAX_CONNECTIONS",
                "a valid u32",
                var("DB_MAX_CONNECTIONS", "20"),
            )?;
            StoreBackend::Postgres {
                database_url,
                max_connections,
            }
        };

        let log_format = match var("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "pretty or json",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            path_base,
            store,
            log_format,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        })
}

/// `todo-app/` -> `/todo-app`; blank or `/` -> no prefix.
fn normalize_path_base(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_with_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/todos")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.path_base, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(
            config.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/todos".to_string(),
                max_connections: 20,
            }
        );
    }

    #[test]
    fn in_memory_does_not_need_a_database_url() {
        let config = load(&[("USE_IN_MEMORY", "TRUE")]).unwrap();
        assert_eq!(config.store, StoreBackend::InMemory);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert_matches!(load(&[]), Err(ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = load(&[("USE_IN_MEMORY", "true"), ("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "PORT", .. });
    }

    #[test]
    fn path_base_is_normalized() {
        let config = load(&[("USE_IN_MEMORY", "true"), ("PATH_BASE", "todo-app/")]).unwrap();
        assert_eq!(config.path_base.as_deref(), Some("/todo-app"));

        let config = load(&[("USE_IN_MEMORY", "true"), ("PATH_BASE", "/")]).unwrap();
        assert_eq!(config.path_base, None);
    }

    #[test]
    fn cors_wildcard_anywhere_allows_any_origin() {
        assert_eq!(CorsOrigins::parse("").unwrap(), CorsOrigins::Any);
        assert_eq!(
            CorsOrigins::parse("http://a.test, *").unwrap(),
            CorsOrigins::Any
        );
    }

    #[test]
    fn cors_list_is_authoritative() {
        let origins = CorsOrigins::parse("http://localhost:4200, https://*.example.com").unwrap();
        let CorsOrigins::List(patterns) = origins else {
            panic!("expected an explicit list");
        };
        assert_eq!(patterns.len(), 2);

        let allowed = |origin: &'static str| {
            patterns
                .iter()
                .any(|p| p.matches(&HeaderValue::from_static(origin)))
        };
        assert!(allowed("http://localhost:4200"));
        assert!(allowed("https://app.example.com"));
        assert!(!allowed("https://example.com"));
        assert!(!allowed("http://app.example.com"));
        assert!(!allowed("https://evil-example.com"));
        assert!(!allowed("http://localhost:3000"));
    }

    #[test]
    fn invalid_log_format_is_reported() {
        let err = load(&[("USE_IN_MEMORY", "true"), ("LOG_FORMAT", "xml")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "LOG_FORMAT", .. });
    }
}
