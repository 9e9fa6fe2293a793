use indexmap::IndexMap;
use std::{fmt, time::Duration};
use strata_core::{Error, Result};
use tokio_postgres::{config::SslMode, Config};
use url::Url;

/// The port used when the URL does not name one.
pub const DEFAULT_PORT: i64 = 5432;

/// Driver-call arguments translated from a connection URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectArgs {
    /// Positional arguments. The driver takes none.
    pub args: Vec<String>,

    /// Keyword options, in the order they were translated
    pub opts: IndexMap<String, ConnectOpt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOpt {
    Str(String),
    Int(i64),
}

/// Translates a connection URL into driver arguments.
///
/// The URL's user maps to the `user` option and its path to `database`. An
/// absent port defaults to 5432. Query parameters are merged in last,
/// verbatim, so they override anything derived from the rest of the URL.
pub fn create_connect_args(url: &Url) -> Result<ConnectArgs> {
    check_scheme(url)?;

    let mut opts = IndexMap::new();

    if let Some(host) = url.host_str().filter(|host| !host.is_empty()) {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        opts.insert("host".to_string(), ConnectOpt::from(host));
    }

    let database = url.path().trim_start_matches('/');
    if !database.is_empty() {
        opts.insert("database".to_string(), ConnectOpt::from(decode(database)?));
    }

    if !url.username().is_empty() {
        opts.insert("user".to_string(), ConnectOpt::from(decode(url.username())?));
    }

    if let Some(password) = url.password() {
        opts.insert("password".to_string(), ConnectOpt::from(decode(password)?));
    }

    let port = url.port().map(i64::from).unwrap_or(DEFAULT_PORT);
    opts.insert("port".to_string(), ConnectOpt::Int(port));

    for (key, value) in url.query_pairs() {
        opts.insert(key.into_owned(), ConnectOpt::Str(value.into_owned()));
    }

    log::debug!(
        "translated connection URL; options={:?}",
        opts.keys().collect::<Vec<_>>()
    );

    Ok(ConnectArgs { args: vec![], opts })
}

fn check_scheme(url: &Url) -> Result<()> {
    let scheme = url.scheme();
    let (dialect, driver) = scheme.split_once('+').unwrap_or((scheme, ""));

    if !matches!(dialect, "postgresql" | "postgres") {
        return Err(Error::invalid_connection_url_at(
            url.as_str(),
            format!("expected a `postgresql` or `postgres` scheme, found `{dialect}`"),
        ));
    }

    if !driver.is_empty() {
        log::debug!("connecting through `{driver}` as named by the URL scheme");
    }

    Ok(())
}

fn decode(component: &str) -> Result<String> {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .map_err(|err| Error::invalid_connection_url(err.to_string()))
}

impl ConnectArgs {
    pub fn get(&self, key: &str) -> Option<&ConnectOpt> {
        self.opts.get(key)
    }

    /// Builds the `tokio-postgres` configuration for these arguments.
    ///
    /// Options the driver does not recognize are logged and skipped.
    pub fn to_config(&self) -> Result<Config> {
        let mut config = Config::new();

        for (key, value) in &self.opts {
            match key.as_str() {
                "host" => {
                    config.host(&value.to_string());
                }
                "database" | "dbname" => {
                    config.dbname(&value.to_string());
                }
                "user" => {
                    config.user(&value.to_string());
                }
                "password" => {
                    config.password(value.to_string());
                }
                "port" => {
                    let port = u16::try_from(value.as_int(key)?).map_err(|_| {
                        Error::invalid_connection_url(format!("port out of range: {value}"))
                    })?;
                    config.port(port);
                }
                "application_name" => {
                    config.application_name(&value.to_string());
                }
                "options" => {
                    config.options(&value.to_string());
                }
                "connect_timeout" => {
                    let seconds = u64::try_from(value.as_int(key)?).map_err(|_| {
                        Error::invalid_connection_url(format!(
                            "connect_timeout must not be negative: {value}"
                        ))
                    })?;
                    config.connect_timeout(Duration::from_secs(seconds));
                }
                "sslmode" => {
                    config.ssl_mode(match value.to_string().as_str() {
                        "disable" => SslMode::Disable,
                        "prefer" => SslMode::Prefer,
                        "require" => SslMode::Require,
                        mode => {
                            return Err(Error::invalid_connection_url(format!(
                                "unsupported sslmode `{mode}`"
                            )))
                        }
                    });
                }
                _ => log::warn!("ignoring unsupported connection option `{key}`"),
            }
        }

        Ok(config)
    }
}

impl ConnectOpt {
    /// Reads the option as an integer, parsing it if it came from the query
    /// string.
    fn as_int(&self, key: &str) -> Result<i64> {
        match self {
            ConnectOpt::Int(value) => Ok(*value),
            ConnectOpt::Str(value) => value.parse().map_err(|_| {
                Error::invalid_connection_url(format!(
                    "`{key}` must be an integer; value={value}"
                ))
            }),
        }
    }
}

impl From<&str> for ConnectOpt {
    fn from(value: &str) -> Self {
        ConnectOpt::Str(value.to_string())
    }
}

impl From<String> for ConnectOpt {
    fn from(value: String) -> Self {
        ConnectOpt::Str(value)
    }
}

impl From<i64> for ConnectOpt {
    fn from(value: i64) -> Self {
        ConnectOpt::Int(value)
    }
}

impl fmt::Display for ConnectOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectOpt::Str(value) => f.write_str(value),
            ConnectOpt::Int(value) => write!(f, "{value}"),
        }
    }
}
