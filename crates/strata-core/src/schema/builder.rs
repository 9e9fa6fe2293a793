mod attrs;
mod declare;
mod discriminator;
mod hierarchy;
mod joined;
mod single;

use crate::Metadata;
use indexmap::IndexMap;

/// Builds a [`Metadata`] with non-default options.
///
/// ```
/// # use strata_core::Metadata;
/// let metadata = Metadata::builder()
///     .table_name_prefix("app_")
///     .union_alias("punion")
///     .reject_duplicate_identities(true)
///     .build();
/// ```
#[derive(Debug)]
pub struct Builder {
    config: Config,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// If set, prefix all table names with this string
    pub(crate) table_name_prefix: Option<String>,

    /// Alias synthesized unions are selected as
    pub(crate) union_alias: String,

    /// Default discriminator column name of synthesized unions
    pub(crate) discriminator_name: String,

    /// Fail declarations that reuse a polymorphic identity instead of
    /// warning
    pub(crate) reject_duplicate_identities: bool,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            config: Config {
                table_name_prefix: None,
                union_alias: "pjoin".to_string(),
                discriminator_name: "type".to_string(),
                reject_duplicate_identities: false,
            },
        }
    }

    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.config.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn union_alias(&mut self, alias: &str) -> &mut Self {
        self.config.union_alias = alias.to_string();
        self
    }

    pub fn concrete_discriminator_name(&mut self, name: &str) -> &mut Self {
        self.config.discriminator_name = name.to_string();
        self
    }

    pub fn reject_duplicate_identities(&mut self, reject: bool) -> &mut Self {
        self.config.reject_duplicate_identities = reject;
        self
    }

    pub fn build(&self) -> Metadata {
        Metadata {
            config: self.config.clone(),
            db: Default::default(),
            classes: vec![],
            unions: vec![],
            concrete: IndexMap::new(),
            savepoint: None,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub(crate) fn table_name(&self, name: &str) -> String {
        match &self.table_name_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        }
    }
}
