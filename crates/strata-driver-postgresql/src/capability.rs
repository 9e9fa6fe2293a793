/// What the PostgreSQL driver supports, as seen by the code issuing
/// statements through it.
#[derive(Debug)]
pub struct Capability {
    /// Compiled statements can be cached and reused
    pub statement_cache: bool,

    /// Statement text may contain non-ASCII characters
    pub unicode_statements: bool,

    /// Bound parameters may contain non-ASCII characters
    pub unicode_binds: bool,

    /// How bound parameters are written in statement text
    pub paramstyle: ParamStyle,

    /// The affected row count of a single statement is reliable
    pub sane_rowcount: bool,

    /// The affected row count of a batch is reliable
    pub sane_multi_rowcount: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `$1`, `$2`, ...
    Dollar,

    /// `?`
    Question,
}

impl Capability {
    pub const POSTGRESQL: Self = Self {
        statement_cache: true,
        unicode_statements: true,
        unicode_binds: true,
        paramstyle: ParamStyle::Dollar,
        sane_rowcount: true,
        sane_multi_rowcount: false,
    };
}
