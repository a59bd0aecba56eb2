use crate::state::RosterState;
use std::{collections::BTreeMap, fmt::Debug};

pub mod records;
pub mod store;
pub mod student;

///a single dynamically-typed SQL value, used both for bound parameters and for decoded columns
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    ///the value as text, with numbers rendered in their usual form
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(r) => Some(r.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null | Self::Real(_) => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

///one row, keyed by column name
pub type Record = BTreeMap<String, FieldValue>;

///a column name known at compile time - request data never ends up in an identifier position
pub trait Column: Copy + Debug + 'static {
    fn name(self) -> &'static str;
}

pub trait Table {
    const NAME: &'static str;
    type Column: Column;

    ///identifies exactly one row, used by `update`
    const KEY: Self::Column;
    ///OR-combined by `list_all` when searching
    const SEARCHABLE: &'static [Self::Column];
}

pub trait DataType: Sized {
    type Id;
    type FormForAdding;
    type FormForUpdating;

    async fn get_from_db_by_id(id: Self::Id, state: &RosterState) -> Option<Self>;
    async fn get_all(state: &RosterState, search: Option<&str>) -> Vec<Self>;
    async fn insert_into_database(to_be_added: Self::FormForAdding, state: &RosterState) -> bool;
    async fn update_in_database(
        id: Self::Id,
        to_be_updated: Self::FormForUpdating,
        state: &RosterState,
    ) -> bool;
    async fn remove_from_database(id: Self::Id, state: &RosterState) -> bool;
}
