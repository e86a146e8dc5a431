//! Form views handed to the template sink.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::validation::{LoginForm, SignUpForm};
use crate::error::AppError;

pub const SIGN_UP_TEMPLATE: &str = "auth/signUp";
pub const LOGIN_TEMPLATE: &str = "auth/login";

/// Everything a template needs to draw an auth form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub template: &'static str,
    pub page_title: &'static str,
    pub error_message: Option<String>,
    pub old_input: Map<String, Value>,
}

const SIGN_UP_FIELDS: [&str; 6] = ["name", "surname", "username", "email", "password", "confirmPassword"];
const LOGIN_FIELDS: [&str; 2] = ["username", "password"];

fn blank_input(fields: &[&str]) -> Map<String, Value> {
    fields.iter().map(|f| (f.to_string(), Value::Null)).collect()
}

impl View {
    pub fn sign_up() -> Self {
        Self {
            template: SIGN_UP_TEMPLATE,
            page_title: "Sign up",
            error_message: None,
            old_input: blank_input(&SIGN_UP_FIELDS),
        }
    }

    pub fn login() -> Self {
        Self {
            template: LOGIN_TEMPLATE,
            page_title: "Login",
            error_message: None,
            old_input: blank_input(&LOGIN_FIELDS),
        }
    }

    /// Sign-up form re-rendered with an error and every submitted value.
    pub fn sign_up_error(message: impl Into<String>, form: &SignUpForm) -> Self {
        let old_input = [
            ("name", &form.name),
            ("surname", &form.surname),
            ("username", &form.username),
            ("email", &form.email),
            ("password", &form.password),
            ("confirmPassword", &form.confirm_password),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();

        Self {
            error_message: Some(message.into()),
            old_input,
            ..Self::sign_up()
        }
    }

    pub fn login_error(message: impl Into<String>, form: &LoginForm) -> Self {
        let old_input = [("username", &form.username), ("password", &form.password)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect();

        Self {
            error_message: Some(message.into()),
            old_input,
            ..Self::login()
        }
    }
}

/// A rendered body and its content type.
pub struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

/// Output sink for views. Swap in a real template engine by implementing this.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View) -> Result<Rendered, AppError>;
}

/// Emits the view model itself as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &View) -> Result<Rendered, AppError> {
        let body = serde_json::to_string(view)
            .map_err(|e| AppError::InternalError(format!("failed to render {}: {e}", view.template)))?;
        Ok(Rendered {
            content_type: "application/json",
            body,
        })
    }
}

pub fn respond(renderer: &dyn Renderer, status: StatusCode, view: &View) -> Result<HttpResponse, AppError> {
    let rendered = renderer.render(view)?;
    Ok(HttpResponse::build(status)
        .content_type(rendered.content_type)
        .body(rendered.body))
}
