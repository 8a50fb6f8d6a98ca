//! User data model and field validation.
//!
//! Submitted fields arrive as [`UserFields`]. Creation turns them into a
//! [`NewUser`] (every rule must pass); updates turn them into [`UserChanges`]
//! (only the fields present are checked and carried). Both collect every
//! failed rule instead of stopping at the first one, so callers can report
//! the full list.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

mod email;

/// Minimum allowed length for a user name, in characters.
pub const NAME_MIN: usize = 2;
/// Minimum allowed length for a password, in characters.
pub const PASSWORD_MIN: usize = 8;

/// Body fields recognised by the user routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Email,
    Password,
    Name,
}

impl UserField {
    /// Field name as it appears in request bodies.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation rules a submitted field can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("email must be a valid email address")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("name must be at least {min} characters")]
    NameTooShort { min: usize },
}

impl UserValidationError {
    /// Field the rule applies to.
    pub const fn field(&self) -> UserField {
        match self {
            Self::InvalidEmail => UserField::Email,
            Self::PasswordTooShort { .. } => UserField::Password,
            Self::NameTooShort { .. } => UserField::Name,
        }
    }
}

/// One failed rule together with the offending input.
///
/// `value` is `None` when the field was absent. Password input is never
/// retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    error: UserValidationError,
    value: Option<String>,
}

impl FieldViolation {
    fn new(error: UserValidationError, value: Option<&str>) -> Self {
        let value = match error.field() {
            UserField::Password => None,
            UserField::Email | UserField::Name => value.map(str::to_owned),
        };
        Self { error, value }
    }

    /// Field the violation refers to.
    pub const fn field(&self) -> UserField {
        self.error.field()
    }

    /// Rule that failed.
    pub const fn error(&self) -> &UserValidationError {
        &self.error
    }

    /// Submitted value, when present and safe to echo.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Every rule that failed for a single request, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    /// Whether no rule failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed rules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldViolation> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}", violation.error)?;
        }
        Ok(())
    }
}

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Syntactically valid email address.
///
/// Accepts UTF-8 local parts and internationalised or punycode domains; the
/// local part is capped at 64 bytes and the whole address at 254 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if !email::is_valid(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// User name of at least [`NAME_MIN`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.chars().count() < NAME_MIN {
            return Err(UserValidationError::NameTooShort { min: NAME_MIN });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Write-only password of at least [`PASSWORD_MIN`] characters.
///
/// The buffer is wiped on drop and `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Validate and construct a [`Password`].
    pub fn new(password: impl Into<String>) -> Result<Self, UserValidationError> {
        let mut password = password.into();
        if password.chars().count() < PASSWORD_MIN {
            password.zeroize();
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(password))
    }

    /// Expose the password for persistence.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A submitted body key outside the recognised fields, with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraColumn {
    pub name: String,
    pub value: String,
}

impl ExtraColumn {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Raw fields submitted to the create and update routes.
///
/// `extra` holds every other body key. Creation forwards them to the store
/// as columns; updates ignore them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub extra: Vec<ExtraColumn>,
}

/// Collects validated values and violations field by field.
#[derive(Default)]
struct FieldChecker {
    errors: ValidationErrors,
}

impl FieldChecker {
    fn check<T>(
        &mut self,
        raw: Option<&str>,
        required: bool,
        parse: impl FnOnce(&str) -> Result<T, UserValidationError>,
        missing: UserValidationError,
    ) -> Option<T> {
        match raw {
            Some(value) => match parse(value) {
                Ok(parsed) => Some(parsed),
                Err(error) => {
                    self.errors.push(FieldViolation::new(error, Some(value)));
                    None
                }
            },
            None => {
                if required {
                    self.errors.push(FieldViolation::new(missing, None));
                }
                None
            }
        }
    }

    fn check_all(
        &mut self,
        fields: &UserFields,
        required: bool,
    ) -> (Option<EmailAddress>, Option<Password>, Option<UserName>) {
        let email = self.check(
            fields.email.as_deref(),
            required,
            |raw: &str| EmailAddress::new(raw),
            UserValidationError::InvalidEmail,
        );
        let password = self.check(
            fields.password.as_deref(),
            required,
            |raw: &str| Password::new(raw),
            UserValidationError::PasswordTooShort { min: PASSWORD_MIN },
        );
        let name = self.check(
            fields.name.as_deref(),
            required,
            |raw: &str| UserName::new(raw),
            UserValidationError::NameTooShort { min: NAME_MIN },
        );
        (email, password, name)
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validated input for the create route.
///
/// `extra` columns are not validated; the store decides whether they exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password: Password,
    pub name: UserName,
    pub extra: Vec<ExtraColumn>,
}

impl NewUser {
    /// Validate submitted fields; all three are required.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::{NewUser, UserFields};
    ///
    /// let fields = UserFields {
    ///     email: Some("a@b.com".into()),
    ///     password: Some("longenough".into()),
    ///     name: Some("Al".into()),
    ///     extra: Vec::new(),
    /// };
    /// let user = NewUser::try_from_fields(&fields).expect("valid user");
    /// assert_eq!(user.name.as_ref(), "Al");
    /// ```
    pub fn try_from_fields(fields: &UserFields) -> Result<Self, ValidationErrors> {
        let mut checker = FieldChecker::default();
        let (email, password, name) = checker.check_all(fields, true);
        checker.finish()?;
        match (email, password, name) {
            (Some(email), Some(password), Some(name)) => Ok(Self {
                email,
                password,
                name,
                extra: fields.extra.clone(),
            }),
            // The checker records a violation for every missing value.
            _ => Err(ValidationErrors::default()),
        }
    }
}

/// Validated partial update; absent fields are left untouched in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
    pub name: Option<UserName>,
}

impl UserChanges {
    /// Validate the submitted fields that are present.
    pub fn try_from_fields(fields: &UserFields) -> Result<Self, ValidationErrors> {
        let mut checker = FieldChecker::default();
        let (email, password, name) = checker.check_all(fields, false);
        checker.finish()?;
        Ok(Self {
            email,
            password,
            name,
        })
    }

    /// Whether the update would set no column at all.
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.name.is_none()
    }
}

/// Public view of a user: never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Full stored row as returned by the list route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let UserRecord {
            id, email, name, ..
        } = record;
        Self { id, email, name }
    }
}
