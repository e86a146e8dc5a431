use actix_session::Session;
use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use tracing::{error, info, warn};

use crate::auth::validation::{LoginForm, SignUpForm, Validate};
use crate::error::{AppError, AuthError};
use crate::views::{respond, View};
use crate::AppState;

pub const TOKEN_COOKIE: &str = "token";
/// Value written over the token cookie on logout.
pub const LOGGED_OUT_TOKEN: &str = "Null";

fn token_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .finish()
}

fn session_write(session: &Session, key: &str, value: impl serde::Serialize) -> Result<(), AppError> {
    session
        .insert(key, value)
        .map_err(|e| AppError::SessionError(e.to_string()))
}

fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location));
    builder
}

pub async fn sign_up_form(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    respond(state.renderer.as_ref(), StatusCode::OK, &View::sign_up())
}

pub async fn login_form(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    respond(state.renderer.as_ref(), StatusCode::OK, &View::login())
}

pub async fn sign_up(
    form: web::Form<SignUpForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    if let Err(violations) = form.validate() {
        info!("Rejected sign-up for {:?}: {}", form.username, violations.first().field);
        let view = View::sign_up_error(violations.first_message(), &form);
        return respond(state.renderer.as_ref(), StatusCode::UNPROCESSABLE_ENTITY, &view);
    }

    if let Err(e) = state.auth_service.register(&form).await {
        error!("Registration failed for {}: {}", form.username, e);
        return Err(e);
    }

    Ok(redirect("/login").finish())
}

pub async fn login(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    if let Err(violations) = form.validate() {
        let view = View::login_error(violations.first_message(), &form);
        return respond(state.renderer.as_ref(), StatusCode::UNPROCESSABLE_ENTITY, &view);
    }

    let success = match state.auth_service.login(&form.username, &form.password).await {
        Ok(success) => success,
        Err(AppError::AuthError(e @ (AuthError::UnknownUser | AuthError::InvalidPassword))) => {
            warn!("Login failed for {}: {}", form.username, e);
            let view = View::login_error(e.to_string(), &form);
            return respond(state.renderer.as_ref(), StatusCode::UNAUTHORIZED, &view);
        }
        Err(e) => {
            error!("Login errored for {}: {}", form.username, e);
            return Err(e);
        }
    };

    if let Some(agent) = req.headers().get(header::USER_AGENT) {
        let agent = String::from_utf8_lossy(agent.as_bytes()).into_owned();
        session_write(&session, "browser", agent)?;
    }
    session_write(&session, "user", &success.user)?;

    info!("Login successful for {}", success.user.username);

    let mut response = redirect("/");
    response.cookie(token_cookie(success.token, state.config.auth.cookie_secure));
    Ok(response.finish())
}

/// Purging hands deletion to the session middleware, which also expires the
/// `sid` cookie. A store that fails to delete turns the response into a 500.
pub async fn logout(session: Session, state: web::Data<AppState>) -> HttpResponse {
    session.purge();

    let mut response = redirect("/");
    response.cookie(token_cookie(LOGGED_OUT_TOKEN.to_string(), state.config.auth.cookie_secure));
    response.finish()
}
