use std::sync::LazyLock;

use garde::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, FieldError, Result};
use crate::models::account::Role;

/// Minimum length of a sign-up password.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

fn required(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("This field is required"));
    }
    Ok(())
}

fn email_address(value: &str, ctx: &()) -> garde::Result {
    required(value, ctx)?;
    if !EMAIL_PATTERN.is_match(value.trim()) {
        return Err(garde::Error::new("Please enter a valid email address"));
    }
    Ok(())
}

fn new_password(value: &str, ctx: &()) -> garde::Result {
    required(value, ctx)?;
    if value.trim().chars().count() < MIN_PASSWORD_LEN {
        return Err(garde::Error::new(
            "Password must be at least 8 characters long",
        ));
    }
    Ok(())
}

fn matches_password(password: &str) -> impl FnOnce(&str, &()) -> garde::Result + '_ {
    move |value, ctx| {
        required(value, ctx)?;
        if value != password {
            return Err(garde::Error::new("Passwords do not match"));
        }
        Ok(())
    }
}

fn role_choice(value: &str, ctx: &()) -> garde::Result {
    required(value, ctx)?;
    if value.parse::<Role>().is_err() {
        return Err(garde::Error::new("Please select a valid role"));
    }
    Ok(())
}

fn accepted(value: &bool, _: &()) -> garde::Result {
    if !*value {
        return Err(garde::Error::new(
            "Please accept the Terms of Service and Privacy Policy",
        ));
    }
    Ok(())
}

/// Runs the garde rules and flattens the report into per-field errors.
fn check<T: Validate<Context = ()>>(form: &T) -> Result<()> {
    form.validate().map_err(|report| {
        AppError::Validation(
            report
                .iter()
                .map(|(path, error)| FieldError::new(path.to_string(), error.to_string()))
                .collect(),
        )
    })
}

/// The sign-in form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInForm {
    #[garde(custom(email_address))]
    pub email: String,
    #[garde(custom(required))]
    pub password: String,
    #[serde(default)]
    #[garde(skip)]
    pub remember: bool,
}

impl SignInForm {
    pub fn check(&self) -> Result<()> {
        check(self)
    }
}

/// The sign-up form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[garde(custom(required))]
    pub firstname: String,
    #[garde(custom(required))]
    pub lastname: String,
    #[garde(custom(email_address))]
    pub email: String,
    #[garde(custom(new_password))]
    pub password: String,
    #[garde(custom(matches_password(&self.password)))]
    pub confirm_password: String,
    #[garde(custom(role_choice))]
    pub role: String,
    #[serde(default)]
    #[garde(custom(accepted))]
    pub terms: bool,
}

impl SignUpForm {
    pub fn check(&self) -> Result<()> {
        check(self)
    }

    /// The selected role. Only meaningful after [`SignUpForm::check`] passed.
    pub fn role(&self) -> Result<Role> {
        self.role.parse().map_err(|_| {
            AppError::Validation(vec![FieldError::new("role", "Please select a valid role")])
        })
    }
}

/// How strong a password looks, as shown under the sign-up password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Fair,
    Good,
    Strong,
}

/// Scores one point each for length, lowercase, uppercase, digit and symbol.
pub fn password_strength(password: &str) -> (PasswordStrength, u8) {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|passed| **passed).count() as u8;

    let strength = match score {
        4.. => PasswordStrength::Strong,
        3 => PasswordStrength::Good,
        2 => PasswordStrength::Fair,
        _ => PasswordStrength::Weak,
    };
    (strength, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up() -> SignUpForm {
        SignUpForm {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
            confirm_password: "analytical".to_string(),
            role: "patient".to_string(),
            terms: true,
        }
    }

    fn fields(err: AppError) -> Vec<(String, String)> {
        match err {
            AppError::Validation(fields) => fields
                .into_iter()
                .map(|f| (f.field, f.message))
                .collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_sign_up_passes() {
        sign_up().check().unwrap();
        assert_eq!(sign_up().role().unwrap(), Role::Patient);
    }

    #[test]
    fn sign_up_collects_every_failing_field() {
        let form = SignUpForm {
            firstname: "  ".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            confirm_password: "shorter".to_string(),
            role: "admin".to_string(),
            terms: false,
            ..sign_up()
        };

        let errors = fields(form.check().unwrap_err());
        assert!(errors.contains(&("firstname".into(), "This field is required".into())));
        assert!(errors.contains(&("email".into(), "Please enter a valid email address".into())));
        assert!(errors.contains(&(
            "password".into(),
            "Password must be at least 8 characters long".into()
        )));
        assert!(errors.contains(&("confirm_password".into(), "Passwords do not match".into())));
        assert!(errors.contains(&("role".into(), "Please select a valid role".into())));
        assert!(errors.contains(&(
            "terms".into(),
            "Please accept the Terms of Service and Privacy Policy".into()
        )));
        assert!(!errors.iter().any(|(field, _)| field == "lastname"));
    }

    #[test]
    fn sign_in_does_not_enforce_password_length() {
        let form = SignInForm {
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
            remember: false,
        };
        form.check().unwrap();

        let form = SignInForm {
            email: "".to_string(),
            password: "".to_string(),
            remember: true,
        };
        let errors = fields(form.check().unwrap_err());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|(_, message)| message == "This field is required"));
    }

    #[test]
    fn email_pattern_needs_a_dotted_domain() {
        assert!(email_address("a@x.com", &()).is_ok());
        assert!(email_address("a@x", &()).is_err());
        assert!(email_address("a b@x.com", &()).is_err());
        assert!(email_address("@x.com", &()).is_err());
    }

    #[test]
    fn strength_levels() {
        assert_eq!(password_strength("abc").0, PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgh").0, PasswordStrength::Fair);
        assert_eq!(password_strength("abcdefgH").0, PasswordStrength::Good);
        assert_eq!(password_strength("abcdefH1"), (PasswordStrength::Strong, 4));
        assert_eq!(password_strength("abcdeH1!"), (PasswordStrength::Strong, 5));
    }
}
