use crate::{
    data::{DataType, student::Student},
    maud_conveniences::{
        escape, form_submit_button, named_form_element, profile_input, render_table,
        simple_form_element, title,
    },
    state::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;
use std::path::Path;

const RELOAD_AFTER_DELETE: &str = r#"
document.body.addEventListener("htmx:afterRequest", (evt) => {
    if (evt.detail.successful && evt.detail.requestConfig.path.startsWith("/delete/")) {
        window.location.reload();
    }
});
"#;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn get_index_route(
    State(state): State<RosterState>,
    Query(SearchQuery { search }): Query<SearchQuery>,
) -> Markup {
    let search = search.filter(|search| !search.is_empty());
    let students = Student::get_all(&state, search.as_deref()).await;
    let static_dir = state.config().asset_config().static_dir.clone();

    let rows = students
        .into_iter()
        .map(|student| student_row(student, &static_dir))
        .collect();

    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-6xl w-full flex flex-col space-y-8" {
            div class="flex flex-row items-center justify-between" {
                (title("Students"))
                form method="get" action="/" class="flex flex-row space-x-2" {
                    input type="search" name="search" value=[search.as_deref()] placeholder="Search..." class="shadow appearance-none border rounded py-2 px-3 leading-tight bg-gray-700 border-gray-600" {}
                    button type="submit" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Search"}
                }
            }

            (render_table(
                "All Students",
                ["Photo", "ID No", "Last Name", "First Name", "Course", "Level", ""],
                rows,
            ))

            div {
                (title("Add New Student"))
                form method="post" action="/add_student" enctype="multipart/form-data" class="p-4" {
                    (simple_form_element("idno", "ID Number", true, Some("number"), None))
                    (simple_form_element("lastname", "Last Name", true, None, None))
                    (simple_form_element("firstname", "First Name", true, None, None))
                    (simple_form_element("course", "Course", true, None, None))
                    (simple_form_element("level", "Level", true, None, None))
                    (profile_input("new_profile"))
                    (form_submit_button(Some("Add Student")))
                }
            }
        }
        script {
            (PreEscaped(RELOAD_AFTER_DELETE))
        }
    })
}

fn student_row(student: Student, static_dir: &Path) -> [Markup; 7] {
    let Student {
        idno,
        lastname,
        firstname,
        course,
        level,
        image,
    } = student;

    let photo = html! {
        @if let Some(src) = public_url(static_dir, &image) {
            img src=(src) alt="Profile" class="w-12 h-12 rounded-full object-cover" {}
        } @else {
            p class="italic" {"None"}
        }
    };

    let actions = html! {
        div class="flex flex-row space-x-2" {
            details {
                summary class="cursor-pointer bg-slate-600 hover:bg-slate-800 font-bold py-1 px-3 rounded" {"Edit"}
                form method="post" action={"/update_student/" (idno)} enctype="multipart/form-data" class="p-4" {
                    (named_form_element(&format!("lastname_{idno}"), "lastname", "Last Name", true, None, Some(&lastname)))
                    (named_form_element(&format!("firstname_{idno}"), "firstname", "First Name", true, None, Some(&firstname)))
                    (named_form_element(&format!("course_{idno}"), "course", "Course", true, None, Some(&course)))
                    (named_form_element(&format!("level_{idno}"), "level", "Level", true, None, Some(&level)))
                    (profile_input(&format!("profile_{idno}")))
                    (form_submit_button(Some("Save")))
                }
            }
            button class="bg-red-600 hover:bg-red-800 font-bold py-1 px-3 rounded h-fit" hx-post={"/delete/" (idno)} hx-confirm={"Delete student " (idno) "?"} hx-swap="none" {
                "Delete"
            }
        }
    };

    [
        photo,
        escape(idno.to_string()),
        escape(lastname),
        escape(firstname),
        escape(course),
        escape(level),
        actions,
    ]
}

///where the browser can fetch `image` from, if it lives inside the static directory
pub fn public_url(static_dir: &Path, image: &str) -> Option<String> {
    let relative = Path::new(image).strip_prefix(static_dir).ok()?;
    let relative = relative.to_string_lossy().replace('\\', "/");
    (!relative.is_empty()).then(|| format!("/static/{relative}"))
}
