use crate::{
    config::DbConfig,
    data::{FieldValue, Record},
    error::{
        BootstrapSchemaSnafu, CreateDirectorySnafu, DecodeColumnSnafu, GetDatabaseConnectionSnafu,
        MakeQuerySnafu, OpenDatabaseSnafu, RosterResult,
    },
};
use snafu::ResultExt;
use sqlx::{
    Column as _, Row as _, TypeInfo as _, ValueRef as _,
    query::Query,
    sqlite::{
        Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
    },
};

const SCHEMA: &str = include_str!("../../schema.sql");

///Runs parameterised SQL against the students database.
///
///Failures never reach callers: reads come back empty and writes come back `false`, with the cause logged.
#[derive(Clone, Debug)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub async fn open(db_config: &DbConfig) -> RosterResult<Self> {
        if let Some(parent) = db_config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .context(CreateDirectorySnafu { path: parent })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_config.path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(db_config.max_connections)
            .connect_with(options)
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context(BootstrapSchemaSnafu)?;

        info!(path = ?db_config.path, "Opened students database");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn query(&self, sql: &str, params: &[FieldValue]) -> Vec<Record> {
        debug!(%sql, ?params, "Running query");
        match self.try_query(sql, params).await {
            Ok(records) => records,
            Err(e) => {
                error!(?e, %sql, "Query failed, returning no records");
                vec![]
            }
        }
    }

    ///whether at least one row was affected
    pub async fn execute(&self, sql: &str, params: &[FieldValue]) -> bool {
        debug!(%sql, ?params, "Running statement");
        match self.try_execute(sql, params).await {
            Ok(rows_affected) => rows_affected > 0,
            Err(e) => {
                error!(?e, %sql, "Statement failed");
                false
            }
        }
    }

    async fn try_query(&self, sql: &str, params: &[FieldValue]) -> RosterResult<Vec<Record>> {
        //connection goes back to the pool when dropped, whichever way we leave
        let mut conn = self
            .pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)?;

        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn try_execute(&self, sql: &str, params: &[FieldValue]) -> RosterResult<u64> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)?;

        Ok(bind_params(sqlx::query(sql), params)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected())
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [FieldValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            FieldValue::Null => query.bind(None::<String>),
            FieldValue::Integer(i) => query.bind(*i),
            FieldValue::Real(r) => query.bind(*r),
            FieldValue::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn row_to_record(row: &SqliteRow) -> RosterResult<Record> {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            let name = column.name();
            let decode_context = || DecodeColumnSnafu { column: name };

            let raw = row.try_get_raw(index).with_context(|_| decode_context())?;
            let value = if raw.is_null() {
                FieldValue::Null
            } else {
                let type_info = raw.type_info();
                match type_info.name() {
                    "INTEGER" => {
                        FieldValue::Integer(row.try_get(index).with_context(|_| decode_context())?)
                    }
                    "REAL" => {
                        FieldValue::Real(row.try_get(index).with_context(|_| decode_context())?)
                    }
                    "TEXT" => {
                        FieldValue::Text(row.try_get(index).with_context(|_| decode_context())?)
                    }
                    _ => {
                        let bytes: Vec<u8> =
                            row.try_get(index).with_context(|_| decode_context())?;
                        FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                    }
                }
            };

            Ok((name.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::scratch_store;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn rows_come_back_as_column_maps() {
        let (_dir, store) = scratch_store().await;

        assert!(
            store
                .execute(
                    "INSERT INTO students (idno, lastname, firstname, course, level, image) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                    &[
                        FieldValue::Integer(7),
                        "Doe".into(),
                        "Jane".into(),
                        "BSIT".into(),
                        "1".into(),
                        "static/images/account.jpg".into(),
                    ],
                )
                .await
        );

        let records = store
            .query(
                "SELECT idno, lastname, NULL AS missing, 1.5 AS ratio FROM students",
                &[],
            )
            .await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["idno"], FieldValue::Integer(7));
        assert_eq!(record["lastname"], FieldValue::Text("Doe".into()));
        assert_eq!(record["missing"], FieldValue::Null);
        assert_eq!(record["ratio"], FieldValue::Real(1.5));
    }

    #[tokio::test]
    async fn failed_queries_are_empty() {
        let (_dir, store) = scratch_store().await;
        assert!(
            store
                .query("SELECT * FROM no_such_table", &[])
                .await
                .is_empty()
        );
        assert!(store.query("SELEKT nonsense", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn failed_statements_are_false() {
        let (_dir, store) = scratch_store().await;

        //NOT NULL constraint
        assert!(
            !store
                .execute(
                    "INSERT INTO students (idno) VALUES (?)",
                    &[FieldValue::Integer(1)]
                )
                .await
        );
        assert!(!store.execute("DELETE FROM nowhere", &[]).await);
    }

    #[tokio::test]
    async fn statements_touching_nothing_are_false() {
        let (_dir, store) = scratch_store().await;
        assert!(
            !store
                .execute(
                    "DELETE FROM students WHERE idno = ?",
                    &[FieldValue::Integer(404)]
                )
                .await
        );
    }
}
