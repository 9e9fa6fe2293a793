mod capability;
pub use capability::{Capability, ParamStyle};

mod connect_args;
pub use connect_args::{create_connect_args, ConnectArgs, ConnectOpt, DEFAULT_PORT};

mod error;
pub use error::{
    classify, driver_error_kind, exception_translation_map, is_disconnect, DbApiError,
};

mod value;
pub(crate) use value::Value;

use postgres::{tls::MakeTlsConnect, types::ToSql, Socket};
use strata_core::{
    schema::db::Table,
    stmt::{self, Row},
    Error, Instance, Metadata, Query, Result,
};
use strata_sql as sql;
use tokio_postgres::{Client, Config, RowStream};
use url::Url;

#[derive(Debug)]
pub struct PostgreSQL {
    /// The PostgreSQL client.
    client: Client,
}

impl PostgreSQL {
    /// Initialize a Strata PostgreSQL driver using an initialized connection.
    pub fn new(connection: Client) -> Self {
        Self { client: connection }
    }

    /// Connects to a PostgreSQL database using a connection URL.
    ///
    /// The URL is translated with [`create_connect_args`]; see there for the
    /// accepted forms.
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|err| Error::invalid_connection_url(err.to_string()))?;
        let config = create_connect_args(&url)?.to_config()?;

        Self::connect_with_config(config, tokio_postgres::NoTls).await
    }

    /// Connects to a PostgreSQL database using a [`tokio_postgres::Config`].
    pub async fn connect_with_config<T>(config: Config, tls: T) -> Result<Self>
    where
        T: MakeTlsConnect<Socket> + 'static,
        T::Stream: Send,
    {
        let (client, connection) = config.connect(tls).await.map_err(Error::driver)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("connection error: {e}");
            }
        });

        Ok(Self::new(client))
    }

    pub fn capability(&self) -> &Capability {
        &Capability::POSTGRESQL
    }

    /// Returns `true` if `err` means this driver's connection is gone.
    pub fn is_disconnect(
        &self,
        err: &dyn std::fmt::Display,
        connection: Option<&Client>,
        cursor: Option<&RowStream>,
    ) -> bool {
        error::is_disconnect(err, connection, cursor)
    }

    /// Executes a single statement, returning the number of rows affected.
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        log::debug!("{sql}");
        self.client.execute(sql, &[]).await.map_err(Error::driver)
    }

    /// Classifies an error returned by this driver.
    ///
    /// Returns `None` when `err` did not come from the database client.
    pub fn classify(&self, err: &Error) -> Option<DbApiError> {
        err.driver_error()?
            .downcast_ref::<tokio_postgres::Error>()
            .map(classify)
    }

    /// Creates a table.
    pub async fn create_table(&self, metadata: &Metadata, table: &Table) -> Result<()> {
        let stmt = sql::Statement::create_table(metadata.schema(), table);
        self.execute_ddl(metadata, &stmt).await
    }

    /// Drops a table.
    pub async fn drop_table(&self, metadata: &Metadata, table: &Table, if_exists: bool) -> Result<()> {
        let stmt = if if_exists {
            sql::Statement::drop_table_if_exists(table)
        } else {
            sql::Statement::drop_table(table)
        };

        self.execute_ddl(metadata, &stmt).await
    }

    /// Drops and recreates every table of `metadata`.
    ///
    /// Tables are dropped in reverse declaration order so that referencing
    /// tables go first. Dropping cascades to foreign keys held by tables
    /// outside of `metadata`.
    pub async fn reset_db(&self, metadata: &Metadata) -> Result<()> {
        for table in metadata.schema().tables.iter().rev() {
            let stmt = sql::stmt::DropTable::new(table).if_exists().cascade();
            self.execute_ddl(metadata, &stmt.into()).await?;
        }

        for table in &metadata.schema().tables {
            self.create_table(metadata, table).await?;
        }

        Ok(())
    }

    /// Runs `query` and loads each returned row as an instance of the class
    /// its discriminator identifies.
    pub async fn all(&self, query: &Query<'_>) -> Result<Vec<Instance>> {
        let metadata = query.metadata();
        let select = query.statement();

        let mut params = Vec::new();
        let sql_as_str = sql::Serializer::postgresql(metadata)
            .serialize(&sql::Statement::Select(select.clone()), &mut params);

        log::debug!("{sql_as_str}");

        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();
        let args = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();

        let rows = self
            .client
            .query(&sql_as_str, &args)
            .await
            .map_err(Error::driver)?;

        let rows = rows
            .iter()
            .map(|row| {
                let mut values = Row::new();

                for (index, column) in select.columns.iter().enumerate() {
                    let ty = &metadata.column(*column).ty;
                    values.insert(*column, value::from_row(row, index, ty)?);
                }

                Ok(values)
            })
            .collect::<Result<Vec<_>>>()?;

        query.load(rows)
    }

    async fn execute_ddl(&self, metadata: &Metadata, stmt: &sql::Statement) -> Result<()> {
        let mut params: Vec<stmt::Value> = Vec::new();
        let sql = sql::Serializer::postgresql(metadata).serialize(stmt, &mut params);

        assert!(
            params.is_empty(),
            "DDL statements shouldn't involve any parameters"
        );

        self.execute(&sql).await?;
        Ok(())
    }
}

impl From<Client> for PostgreSQL {
    fn from(client: Client) -> Self {
        Self { client }
    }
}
