//! Generic record operations over any [`Table`].
//!
//! Table and column names only ever come from [`Table`]/[`Column`] implementations, values are always bound.

use crate::data::{Column, FieldValue, Record, Table, store::RecordStore};

///every record, ordered by key ascending.
///
///with a non-empty `search`, only records where any [`Table::SEARCHABLE`] column contains it
pub async fn list_all<T: Table>(store: &RecordStore, search: Option<&str>) -> Vec<Record> {
    let mut sql = format!("SELECT * FROM {}", T::NAME);
    let mut params = vec![];

    if let Some(search) = search.filter(|search| !search.is_empty())
        && !T::SEARCHABLE.is_empty()
    {
        let clause = T::SEARCHABLE
            .iter()
            .map(|column| format!("{} LIKE ? ESCAPE '\\'", column.name()))
            .collect::<Vec<_>>()
            .join(" OR ");
        sql.push_str(&format!(" WHERE {clause}"));

        let pattern = FieldValue::Text(format!("%{}%", escape_like(search)));
        params = vec![pattern; T::SEARCHABLE.len()];
    }

    sql.push_str(&format!(" ORDER BY {} ASC", T::KEY.name()));
    store.query(&sql, &params).await
}

///records matching every filter pair. an empty filter matches nothing rather than everything
pub async fn find<T: Table>(
    store: &RecordStore,
    filter: &[(T::Column, FieldValue)],
) -> Vec<Record> {
    if filter.is_empty() {
        debug!(table = T::NAME, "Refusing to find with an empty filter");
        return vec![];
    }

    let (clause, params) = conditions(filter, " AND ");
    let sql = format!("SELECT * FROM {} WHERE {clause}", T::NAME);
    store.query(&sql, &params).await
}

pub async fn insert<T: Table>(store: &RecordStore, fields: &[(T::Column, FieldValue)]) -> bool {
    if fields.is_empty() {
        debug!(table = T::NAME, "Refusing to insert nothing");
        return false;
    }

    let columns = fields
        .iter()
        .map(|(column, _)| column.name())
        .collect::<Vec<_>>()
        .join(",");
    let placeholders = vec!["?"; fields.len()].join(",");
    let params = fields
        .iter()
        .map(|(_, value)| value.clone())
        .collect::<Vec<_>>();

    let sql = format!("INSERT INTO {} ({columns}) VALUES ({placeholders})", T::NAME);
    store.execute(&sql, &params).await
}

///sets every given field on the record whose [`Table::KEY`] is `key`
pub async fn update<T: Table>(
    store: &RecordStore,
    key: FieldValue,
    fields: &[(T::Column, FieldValue)],
) -> bool {
    if fields.is_empty() {
        debug!(table = T::NAME, "Refusing to update nothing");
        return false;
    }

    let (set_clause, mut params) = conditions(fields, ", ");
    params.push(key);

    let sql = format!(
        "UPDATE {} SET {set_clause} WHERE {}=?",
        T::NAME,
        T::KEY.name()
    );
    store.execute(&sql, &params).await
}

///removes records matching every filter pair. an empty filter removes nothing
pub async fn delete<T: Table>(
    store: &RecordStore,
    filter: &[(T::Column, FieldValue)],
) -> bool {
    if filter.is_empty() {
        debug!(table = T::NAME, "Refusing to delete with an empty filter");
        return false;
    }

    let (clause, params) = conditions(filter, " AND ");
    let sql = format!("DELETE FROM {} WHERE {clause}", T::NAME);
    store.execute(&sql, &params).await
}

///`column=?` pairs joined by `separator`, alongside the values to bind
fn conditions<C: Column>(
    pairs: &[(C, FieldValue)],
    separator: &str,
) -> (String, Vec<FieldValue>) {
    let clause = pairs
        .iter()
        .map(|(column, _)| format!("{}=?", column.name()))
        .collect::<Vec<_>>()
        .join(separator);
    let params = pairs.iter().map(|(_, value)| value.clone()).collect();
    (clause, params)
}

fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
