use super::Serializer;

use strata_core::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl<'a> Serializer<'a> {
    pub fn sqlite(metadata: &'a Metadata) -> Serializer<'a> {
        Serializer {
            metadata,
            flavor: Flavor::Sqlite,
        }
    }

    pub fn postgresql(metadata: &'a Metadata) -> Serializer<'a> {
        Serializer {
            metadata,
            flavor: Flavor::Postgresql,
        }
    }

    pub fn mysql(metadata: &'a Metadata) -> Serializer<'a> {
        Serializer {
            metadata,
            flavor: Flavor::Mysql,
        }
    }

    pub(super) fn is_mysql(&self) -> bool {
        self.flavor == Flavor::Mysql
    }
}
