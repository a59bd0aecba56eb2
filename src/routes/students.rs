use crate::{
    assets::UploadedFile,
    data::{
        DataType,
        student::{AddStudentForm, Student, StudentDetails},
    },
    error::{MultipartSnafu, RosterResult},
    routes::back_to_listing,
    state::RosterState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::Response,
};
use serde::Serialize;
use snafu::ResultExt;
use std::collections::HashMap;

///a decoded multipart student form: text fields by name, plus the `profile` file part if sent
#[derive(Debug, Default)]
struct StudentSubmission {
    fields: HashMap<String, String>,
    profile: Option<UploadedFile>,
}

impl StudentSubmission {
    async fn read(mut multipart: Multipart) -> RosterResult<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.context(MultipartSnafu)? {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };

            if name == "profile" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.context(MultipartSnafu)?;
                submission.profile = Some(UploadedFile { file_name, bytes });
            } else {
                let value = field.text().await.context(MultipartSnafu)?;
                submission.fields.insert(name, value);
            }
        }

        Ok(submission)
    }

    ///present and non-empty
    fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name).filter(|value| !value.is_empty())
    }
}

pub async fn post_add_student(
    State(state): State<RosterState>,
    multipart: Multipart,
) -> RosterResult<Response> {
    let mut submission = StudentSubmission::read(multipart).await?;

    let (Some(idno), Some(lastname), Some(firstname), Some(course), Some(level)) = (
        submission.take("idno"),
        submission.take("lastname"),
        submission.take("firstname"),
        submission.take("course"),
        submission.take("level"),
    ) else {
        debug!("Add student form missing required fields");
        return Ok(back_to_listing());
    };
    let Ok(idno) = idno.trim().parse::<i64>() else {
        debug!(?idno, "Add student form had a non-numeric idno");
        return Ok(back_to_listing());
    };
    //the upload would land on the existing student's `<idno>_<name>` file
    if Student::get_from_db_by_id(idno, &state).await.is_some() {
        warn!(idno, "Tried to add a student that already exists");
        return Ok(back_to_listing());
    }

    let image = state.images().store(idno, submission.profile).await?;
    let form = AddStudentForm {
        idno,
        details: StudentDetails {
            lastname,
            firstname,
            course,
            level,
            image: image.clone(),
        },
    };

    if Student::insert_into_database(form, &state).await {
        info!(idno, "Added student");
    } else {
        warn!(idno, "Unable to add student");
        discard_orphaned_image(&state, idno, &image).await?;
    }

    Ok(back_to_listing())
}

///removes an image written for a failed insert, unless the student already in the table is using it
async fn discard_orphaned_image(state: &RosterState, idno: i64, image: &str) -> RosterResult<()> {
    if image == state.images().default_image() {
        return Ok(());
    }

    match Student::get_from_db_by_id(idno, state).await {
        Some(existing) if existing.image == image => Ok(()),
        _ => state.images().remove(image).await,
    }
}

pub async fn post_update_student(
    State(state): State<RosterState>,
    Path(idno): Path<String>,
    multipart: Multipart,
) -> RosterResult<Response> {
    let Ok(idno) = idno.trim().parse::<i64>() else {
        debug!(?idno, "Tried to update a non-numeric idno");
        return Ok(back_to_listing());
    };
    let Some(existing) = Student::get_from_db_by_id(idno, &state).await else {
        debug!(idno, "Tried to update a missing student");
        return Ok(back_to_listing());
    };

    let mut submission = StudentSubmission::read(multipart).await?;
    let image = state
        .images()
        .replace(idno, &existing.image, submission.profile.take())
        .await?;

    //full replace - anything not sent is blanked
    let details = StudentDetails {
        lastname: submission.take("lastname").unwrap_or_default(),
        firstname: submission.take("firstname").unwrap_or_default(),
        course: submission.take("course").unwrap_or_default(),
        level: submission.take("level").unwrap_or_default(),
        image,
    };

    if Student::update_in_database(idno, details, &state).await {
        info!(idno, "Updated student");
    } else {
        warn!(idno, "Unable to update student");
    }

    Ok(back_to_listing())
}

#[derive(Serialize, Debug)]
pub struct DeleteAcknowledgement {
    pub message: String,
}

pub async fn post_delete_student(
    State(state): State<RosterState>,
    Path(idno): Path<String>,
) -> RosterResult<Json<DeleteAcknowledgement>> {
    match idno.trim().parse::<i64>() {
        Ok(parsed) => {
            if let Some(student) = Student::get_from_db_by_id(parsed, &state).await {
                state.images().remove(&student.image).await?;
            }

            if Student::remove_from_database(parsed, &state).await {
                info!(idno = parsed, "Deleted student");
            } else {
                warn!(idno = parsed, "Delete removed no students");
            }
        }
        //can't match anything in an integer key column
        Err(_) => debug!(?idno, "Tried to delete a non-numeric idno"),
    }

    Ok(Json(DeleteAcknowledgement {
        message: format!("Student {idno} deleted successfully!"),
    }))
}
