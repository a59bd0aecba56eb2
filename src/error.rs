use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::{num::ParseIntError, path::PathBuf};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error creating the students table"))]
    BootstrapSchema { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error decoding column `{}`", column))]
    DecodeColumn { source: sqlx::Error, column: String },
    #[snafu(display("Record is missing a usable `{}` column", column))]
    MalformedRecord { column: &'static str },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to create directory {}", path.display()))]
    CreateDirectory {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to write image {}", path.display()))]
    WriteImage {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to remove image {}", path.display()))]
    RemoveImage {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error with multipart form input"))]
    Multipart {
        source: axum::extract::multipart::MultipartError,
    },
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error

        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error"}
                    span {(desc)}
                }
            }
        };

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::BootstrapSchema { .. } => ISE,
            Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
                _ => ISE,
            },
            Self::DecodeColumn { .. } | Self::MalformedRecord { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseNumber { .. } => ISE,
            Self::CreateDirectory { .. } | Self::WriteImage { .. } | Self::RemoveImage { .. } => {
                ISE
            }
            Self::Multipart { source } => source.status(),
        };

        error!(?self, "Error!");
        (status_code, Html(basic_error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_internal_server_errors() {
        let error = RosterError::RemoveImage {
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            path: PathBuf::from("static/uploads/1_a.png"),
        };
        assert_eq!(
            error.to_string(),
            "Unable to remove image static/uploads/1_a.png"
        );
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_rows_are_not_found() {
        let error = RosterError::MakeQuery {
            source: sqlx::Error::RowNotFound,
        };
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
