use axum::extract::rejection::PathRejection;
use axum::extract::{OriginalUri, Path, Request, State};
use axum::http::{header, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

use common::guard::{authorize, Access, RequestedPath};
use common::registry::{AccessCode, CodeRegistry};
use common::verify::LETTERS_PREFIX;

use crate::ServiceState;

/// Cookie carrying the authorization token
pub const AUTH_COOKIE_NAME: &str = "authorized_directory";

/// How long an issued token stays in the browser
pub const AUTH_COOKIE_MAX_AGE: time::Duration = time::Duration::days(7);

/// Build the cookie handed out after a successful verification
pub fn token_cookie(token: &AccessCode) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(AUTH_COOKIE_MAX_AGE)
        .build()
}

/// Send the client back to the code entry page
pub fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

/// Gate for `/letters/*slug`: the token cookie must unlock the first
/// segment of the requested path. Allowed requests carry the parsed
/// [`RequestedPath`] on to the handler as an extension.
pub async fn require_authorization(
    State(state): State<ServiceState>,
    jar: CookieJar,
    OriginalUri(original_uri): OriginalUri,
    slug: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar.get(AUTH_COOKIE_NAME).map(|cookie| cookie.value());

    let slug = match slug {
        Ok(Path(slug)) => slug,
        Err(rejection) => {
            tracing::debug!(%rejection, "undecodable letters path");
            return undecodable_path(state.registry(), &original_uri, token);
        }
    };
    let requested = RequestedPath::parse(&slug);

    match authorize(state.registry(), &requested, token) {
        Access::Allow(directory) => {
            tracing::debug!(%directory, "authorized letters request");
            request.extensions_mut().insert(requested);
            next.run(request).await
        }
        Access::Deny(reason) => {
            tracing::debug!(
                ?reason,
                directory = requested.directory(),
                "denied letters request"
            );
            redirect_home()
        }
    }
}

/// A slug that doesn't percent-decode to UTF-8 can't name a file.
/// It is still authorized, against the raw path, before answering 404.
fn undecodable_path(registry: &CodeRegistry, uri: &Uri, token: Option<&str>) -> Response {
    let raw = uri.path().strip_prefix(LETTERS_PREFIX).unwrap_or(uri.path());
    let requested = RequestedPath::parse(raw);

    match authorize(registry, &requested, token) {
        Access::Allow(directory) => {
            tracing::debug!(%directory, "authorized undecodable letters path");
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Not found",
            )
                .into_response()
        }
        Access::Deny(reason) => {
            tracing::debug!(?reason, "denied undecodable letters request");
            redirect_home()
        }
    }
}
