use crate::{
    data::{Column, DataType, FieldValue, Record, Table, records},
    error::{MalformedRecordSnafu, RosterResult},
    state::RosterState,
};
use snafu::OptionExt;

pub struct Students;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StudentColumn {
    Idno,
    Lastname,
    Firstname,
    Course,
    Level,
    Image,
}

impl Column for StudentColumn {
    fn name(self) -> &'static str {
        match self {
            Self::Idno => "idno",
            Self::Lastname => "lastname",
            Self::Firstname => "firstname",
            Self::Course => "course",
            Self::Level => "level",
            Self::Image => "image",
        }
    }
}

impl Table for Students {
    const NAME: &'static str = "students";
    type Column = StudentColumn;
    const KEY: StudentColumn = StudentColumn::Idno;
    const SEARCHABLE: &'static [StudentColumn] = &[
        StudentColumn::Idno,
        StudentColumn::Lastname,
        StudentColumn::Firstname,
        StudentColumn::Course,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub idno: i64,
    pub lastname: String,
    pub firstname: String,
    pub course: String,
    pub level: String,
    pub image: String,
}

///everything a student is made of - `image` is the stored path, not the upload
#[derive(Debug, Clone)]
pub struct StudentDetails {
    pub lastname: String,
    pub firstname: String,
    pub course: String,
    pub level: String,
    pub image: String,
}

impl StudentDetails {
    fn into_fields(self) -> Vec<(StudentColumn, FieldValue)> {
        let Self {
            lastname,
            firstname,
            course,
            level,
            image,
        } = self;

        vec![
            (StudentColumn::Lastname, lastname.into()),
            (StudentColumn::Firstname, firstname.into()),
            (StudentColumn::Course, course.into()),
            (StudentColumn::Level, level.into()),
            (StudentColumn::Image, image.into()),
        ]
    }
}

pub struct AddStudentForm {
    pub idno: i64,
    pub details: StudentDetails,
}

impl Student {
    ///`default_image` stands in for a missing or NULL `image` column
    pub fn from_record(mut record: Record, default_image: &str) -> RosterResult<Self> {
        let idno = record
            .get(StudentColumn::Idno.name())
            .and_then(FieldValue::as_integer)
            .context(MalformedRecordSnafu {
                column: StudentColumn::Idno.name(),
            })?;
        let mut text = |column: StudentColumn| {
            record
                .remove(column.name())
                .and_then(|value| value.as_text())
                .context(MalformedRecordSnafu {
                    column: column.name(),
                })
        };

        Ok(Self {
            idno,
            lastname: text(StudentColumn::Lastname)?,
            firstname: text(StudentColumn::Firstname)?,
            course: text(StudentColumn::Course)?,
            level: text(StudentColumn::Level)?,
            image: text(StudentColumn::Image).unwrap_or_else(|_| default_image.to_string()),
        })
    }

    fn from_records(records: Vec<Record>, default_image: &str) -> Vec<Self> {
        records
            .into_iter()
            .filter_map(|record| match Self::from_record(record, default_image) {
                Ok(student) => Some(student),
                Err(e) => {
                    warn!(?e, "Skipping unreadable student record");
                    None
                }
            })
            .collect()
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForAdding = AddStudentForm;
    type FormForUpdating = StudentDetails;

    async fn get_from_db_by_id(id: Self::Id, state: &RosterState) -> Option<Self> {
        let records =
            records::find::<Students>(state.store(), &[(StudentColumn::Idno, id.into())]).await;
        Self::from_records(records, state.images().default_image())
            .into_iter()
            .next()
    }

    async fn get_all(state: &RosterState, search: Option<&str>) -> Vec<Self> {
        let records = records::list_all::<Students>(state.store(), search).await;
        Self::from_records(records, state.images().default_image())
    }

    async fn insert_into_database(to_be_added: Self::FormForAdding, state: &RosterState) -> bool {
        let AddStudentForm { idno, details } = to_be_added;

        let mut fields = vec![(StudentColumn::Idno, idno.into())];
        fields.extend(details.into_fields());
        records::insert::<Students>(state.store(), &fields).await
    }

    async fn update_in_database(
        id: Self::Id,
        to_be_updated: Self::FormForUpdating,
        state: &RosterState,
    ) -> bool {
        records::update::<Students>(state.store(), id.into(), &to_be_updated.into_fields()).await
    }

    async fn remove_from_database(id: Self::Id, state: &RosterState) -> bool {
        records::delete::<Students>(state.store(), &[(StudentColumn::Idno, id.into())]).await
    }
}
