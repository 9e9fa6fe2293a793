use indexmap::IndexMap;
use std::fmt;

/// The canonical database error vocabulary errors are reported in,
/// independent of the driver that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbApiError {
    Error,
    InterfaceError,
    DatabaseError,
    DataError,
    OperationalError,
    IntegrityError,
    InternalError,
    ProgrammingError,
    NotSupportedError,
}

impl DbApiError {
    pub const ALL: [DbApiError; 9] = [
        DbApiError::Error,
        DbApiError::InterfaceError,
        DbApiError::DatabaseError,
        DbApiError::DataError,
        DbApiError::OperationalError,
        DbApiError::IntegrityError,
        DbApiError::InternalError,
        DbApiError::ProgrammingError,
        DbApiError::NotSupportedError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DbApiError::Error => "Error",
            DbApiError::InterfaceError => "InterfaceError",
            DbApiError::DatabaseError => "DatabaseError",
            DbApiError::DataError => "DataError",
            DbApiError::OperationalError => "OperationalError",
            DbApiError::IntegrityError => "IntegrityError",
            DbApiError::InternalError => "InternalError",
            DbApiError::ProgrammingError => "ProgrammingError",
            DbApiError::NotSupportedError => "NotSupportedError",
        }
    }

    /// Classifies a server error by the class (first two characters) of its
    /// SQLSTATE code.
    pub fn from_sqlstate(code: &str) -> DbApiError {
        match code.get(..2).unwrap_or_default() {
            "08" | "40" | "53" | "57" | "58" => DbApiError::OperationalError,
            "0A" => DbApiError::NotSupportedError,
            "22" => DbApiError::DataError,
            "23" => DbApiError::IntegrityError,
            "26" | "34" | "3D" | "3F" | "42" => DbApiError::ProgrammingError,
            "P0" | "XX" => DbApiError::InternalError,
            _ => DbApiError::DatabaseError,
        }
    }
}

impl fmt::Display for DbApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `tokio-postgres` error kinds, keyed by the message each kind's errors
/// start with.
const DRIVER_KINDS: &[(&str, &str)] = &[
    ("connection closed", "Closed"),
    ("db error", "Db"),
    ("error communicating with the server", "Io"),
    ("unexpected message from server", "UnexpectedMessage"),
    ("error performing TLS handshake", "Tls"),
    ("error serializing parameter", "ToSql"),
    ("error deserializing column", "FromSql"),
    ("invalid column", "Column"),
    ("expected ", "Parameters"),
    ("error parsing response from server", "Parse"),
    ("error encoding message to server", "Encode"),
    ("authentication error", "Authentication"),
    ("invalid connection string", "ConfigParse"),
    ("invalid configuration", "Config"),
    ("query returned an unexpected number of rows", "RowCount"),
    ("error connecting to server", "Connect"),
    ("timeout waiting for server", "Timeout"),
];

/// Maps the driver's error kinds to the canonical vocabulary.
pub fn exception_translation_map() -> IndexMap<&'static str, DbApiError> {
    use DbApiError::*;

    IndexMap::from([
        ("Closed", OperationalError),
        ("Db", DatabaseError),
        ("Io", OperationalError),
        ("UnexpectedMessage", InterfaceError),
        ("Tls", OperationalError),
        ("ToSql", ProgrammingError),
        ("FromSql", DataError),
        ("Column", ProgrammingError),
        ("Parameters", ProgrammingError),
        ("Parse", InterfaceError),
        ("Encode", InterfaceError),
        ("Authentication", OperationalError),
        ("ConfigParse", InterfaceError),
        ("Config", InterfaceError),
        ("RowCount", ProgrammingError),
        ("Connect", OperationalError),
        ("Timeout", OperationalError),
    ])
}

/// Names the driver error kind a message was produced by.
pub fn driver_error_kind(message: &str) -> Option<&'static str> {
    DRIVER_KINDS
        .iter()
        .find(|(prefix, _)| message.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

/// Classifies a driver error.
///
/// Server errors are classified by SQLSTATE. Other errors go through
/// [`exception_translation_map`], falling back to the generic
/// [`DbApiError::Error`].
pub fn classify(err: &tokio_postgres::Error) -> DbApiError {
    if let Some(db) = err.as_db_error() {
        return DbApiError::from_sqlstate(db.code().code());
    }

    let kind = if err.is_closed() {
        Some("Closed")
    } else {
        driver_error_kind(&err.to_string())
    };

    kind.and_then(|kind| exception_translation_map().get(kind).copied())
        .unwrap_or(DbApiError::Error)
}

/// Returns `true` if `err` reports that the connection is gone.
///
/// Only the error's message is consulted; the connection and cursor the
/// error was raised on are accepted for call-site compatibility.
pub fn is_disconnect<C, K>(err: &dyn fmt::Display, _connection: Option<&C>, _cursor: Option<&K>) -> bool {
    err.to_string().contains("connection is closed")
}
