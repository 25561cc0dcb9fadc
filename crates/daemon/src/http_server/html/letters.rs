use std::path::Path;

use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Extension;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use common::guard::RequestedPath;
use common::lister::{ListError, Listing};
use common::render::{render, ListingView};

use crate::ServiceState;

#[derive(Template)]
#[template(path = "pages/letters.html")]
pub struct LettersTemplate {
    pub view: ListingView,
}

/// Browse an authorized path: files are streamed back as-is,
/// directories are rendered as a listing page.
#[tracing::instrument(skip_all)]
pub async fn handler(
    State(state): State<ServiceState>,
    Extension(requested): Extension<RequestedPath>,
    request: Request,
) -> Response {
    match state.lister().list(&requested).await {
        Ok(Listing::File(path)) => serve_file(&path, request).await,
        Ok(Listing::Directory(entries)) => {
            let view = render(requested.directory(), requested.subpath(), &entries);
            LettersTemplate { view }.into_response()
        }
        Err(e) => LettersError::from(e).into_response(),
    }
}

async fn serve_file(path: &Path, request: Request) -> Response {
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LettersError {
    #[error("not found")]
    NotFound,
    #[error("failed to list directory: {0}")]
    Listing(ListError),
}

impl From<ListError> for LettersError {
    fn from(e: ListError) -> Self {
        match e {
            ListError::NotFound => LettersError::NotFound,
            other => LettersError::Listing(other),
        }
    }
}

impl IntoResponse for LettersError {
    fn into_response(self) -> Response {
        match self {
            LettersError::NotFound => plain_text(StatusCode::NOT_FOUND, "Not found"),
            LettersError::Listing(e) => {
                tracing::error!("failed to serve letters: {}", e);
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::io;

    use common::lister::DirectoryEntry;

    use super::*;

    #[test]
    fn test_list_errors_map_to_status() {
        let response = LettersError::from(ListError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            LettersError::from(ListError::Io(io::Error::other("disk on fire"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_template_renders_entries() {
        let entries = vec![
            DirectoryEntry::Folder {
                name: "040124".into(),
            },
            DirectoryEntry::File {
                name: "notes.txt".into(),
            },
        ];
        let html = LettersTemplate {
            view: render("family", &[], &entries),
        }
        .render()
        .unwrap();

        assert!(html.contains("letters for family"));
        assert!(html.contains("April 1st, 2024"));
        assert!(html.contains("040124"));
        assert!(html.contains("notes.txt"));
        assert_eq!(html.matches(r#"target="_blank""#).count(), 1);
        assert!(!html.contains("No dates yet."));
    }

    #[test]
    fn test_template_renders_empty_states() {
        let html = LettersTemplate {
            view: render("family", &[], &[]),
        }
        .render()
        .unwrap();
        assert!(html.contains("No dates yet."));

        let html = LettersTemplate {
            view: render("family", &["040124".to_string()], &[]),
        }
        .render()
        .unwrap();
        assert!(html.contains("No files yet."));
        assert!(html.contains("letters from April 1st, 2024"));
        assert!(html.contains("back to all dates"));
    }
}
