use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sign-up form body. Missing fields arrive as empty strings so that they
/// reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpForm {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// Ordered, non-empty list of failed checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    fn from_vec(violations: Vec<Violation>) -> Option<Self> {
        (!violations.is_empty()).then_some(Self(violations))
    }

    pub fn first(&self) -> &Violation {
        &self.0[0]
    }

    pub fn first_message(&self) -> &str {
        &self.first().message
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }
}

pub trait Validate {
    /// Runs every check in a fixed order and reports all failures.
    fn validate(&self) -> Result<(), Violations>;
}

pub const MIN_PASSWORD_LEN: usize = 5;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

pub fn valid_email(email: &str) -> bool {
    EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email))
}

struct Checks(Vec<Violation>);

impl Checks {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn require(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
        if !ok {
            self.0.push(Violation {
                field,
                message: message.to_string(),
            });
        }
        self
    }

    fn finish(&mut self) -> Result<(), Violations> {
        match Violations::from_vec(std::mem::take(&mut self.0)) {
            Some(violations) => Err(violations),
            None => Ok(()),
        }
    }
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

impl Validate for SignUpForm {
    fn validate(&self) -> Result<(), Violations> {
        Checks::new()
            .require(present(&self.name), "name", "Please enter your name.")
            .require(present(&self.surname), "surname", "Please enter your surname.")
            .require(present(&self.username), "username", "Please enter a username.")
            .require(valid_email(&self.email), "email", "Please enter a valid email.")
            .require(
                self.password.chars().count() >= MIN_PASSWORD_LEN,
                "password",
                "Password must be at least 5 characters long.",
            )
            .require(
                self.confirm_password == self.password,
                "confirmPassword",
                "Passwords have to match!",
            )
            .finish()
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), Violations> {
        Checks::new()
            .require(present(&self.username), "username", "Please enter your username.")
            .require(present(&self.password), "password", "Please enter your password.")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> SignUpForm {
        SignUpForm {
            name: "Alice".into(),
            surname: "Liddell".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "pw123".into(),
            confirm_password: "pw123".into(),
        }
    }

    #[test]
    fn test_valid_sign_up() {
        assert!(alice().validate().is_ok());
    }

    #[test]
    fn test_missing_email() {
        let form = SignUpForm { email: String::new(), ..alice() };
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.iter().count(), 1);
        assert_eq!(violations.first().field, "email");
        assert_eq!(violations.first_message(), "Please enter a valid email.");
    }

    #[test]
    fn test_first_violation_follows_check_order() {
        let form = SignUpForm {
            name: String::new(),
            email: "not-an-email".into(),
            confirm_password: "different".into(),
            ..alice()
        };
        let violations = form.validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "email", "confirmPassword"]);
        assert_eq!(violations.first_message(), "Please enter your name.");
    }

    #[test]
    fn test_password_rules() {
        let short = SignUpForm { password: "pw1".into(), confirm_password: "pw1".into(), ..alice() };
        assert_eq!(short.validate().unwrap_err().first().field, "password");

        let mismatch = SignUpForm { confirm_password: "pw124".into(), ..alice() };
        assert_eq!(
            mismatch.validate().unwrap_err().first_message(),
            "Passwords have to match!"
        );
    }

    #[test]
    fn test_login_form() {
        let ok = LoginForm { username: "alice".into(), password: "wrong".into() };
        assert!(ok.validate().is_ok());

        let blank = LoginForm::default();
        let violations = blank.validate().unwrap_err();
        assert_eq!(violations.iter().count(), 2);
        assert_eq!(violations.first().field, "username");
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("alice@example.com"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("alice example.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn test_email_pattern_compiles_once() {
        assert!(EMAIL_PATTERN.is_some());
        let first = EMAIL_PATTERN.as_ref().map(|re| re as *const Regex);
        assert!(valid_email("bob@example.org"));
        assert_eq!(EMAIL_PATTERN.as_ref().map(|re| re as *const Regex), first);
    }

    #[test]
    fn test_form_field_names() {
        let form: SignUpForm = serde_json::from_value(serde_json::json!({
            "name": "Alice",
            "confirmPassword": "pw123"
        }))
        .unwrap();
        assert_eq!(form.confirm_password, "pw123");
        assert_eq!(form.email, "");
    }
}
