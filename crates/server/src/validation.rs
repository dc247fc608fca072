//! Request bodies and their field rules
//!
//! Handlers take [`ValidatedJson<T>`] instead of `Json<T>`. The body is first
//! read as a JSON object and every field listed in [`BodyShape::FIELDS`] is
//! type-checked; a mistyped field becomes a field error and is dropped. The
//! rest is deserialised into `T` and checked against its `validator` rules.
//! All failures come back together as one 400 listing each offending field.
//! Missing fields deserialise as empty strings so they fail with their field
//! message rather than a parse error.

use std::collections::HashSet;

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::auth::NewUser;
use crate::error::{field_errors, Error, FieldError, Result};
use crate::models::{deserialize_tags, PostDraft};

pub const MSG_EMAIL: &str = "Invalid email format";
pub const MSG_PASSWORD: &str = "Password must be at least 5 characters";
pub const MSG_FULL_NAME: &str = "Full name must be at least 3 characters";
pub const MSG_AVATAR_URL: &str = "Invalid avatar URL";
pub const MSG_TITLE: &str = "Enter the post title";
pub const MSG_TEXT: &str = "Enter the post text";
pub const MSG_TAGS: &str = "Invalid tag format (specify an array)";
pub const MSG_IMAGE_URL: &str = "Invalid image URL";

/// JSON type a body field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string (may be absent)
    Text,
    /// A string or `null` (may be absent)
    OptionalText,
    /// An array of strings, a comma-separated string, or `null`
    Tags,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::String(_)) => true,
            (FieldKind::OptionalText | FieldKind::Tags, Value::Null) => true,
            (FieldKind::Tags, Value::Array(items)) => items.iter().all(Value::is_string),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Field name as it appears on the wire
    pub name: &'static str,
    pub kind: FieldKind,
    pub message: &'static str,
}

const fn rule(name: &'static str, kind: FieldKind, message: &'static str) -> FieldRule {
    FieldRule {
        name,
        kind,
        message,
    }
}

/// Expected JSON types of a request body's fields
pub trait BodyShape {
    const FIELDS: &'static [FieldRule];
}

/// Check field types in place, removing mistyped fields from `object`
fn check_shape(object: &mut serde_json::Map<String, Value>, rules: &[FieldRule]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for rule in rules {
        let mistyped = object
            .get(rule.name)
            .is_some_and(|value| !rule.kind.accepts(value));
        if mistyped {
            object.remove(rule.name);
            errors.push(FieldError {
                field: rule.name.to_string(),
                message: rule.message.to_string(),
            });
        }
    }
    errors
}

/// `fullName` and `full_name` name the same field
fn field_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
}

impl BodyShape for LoginRequest {
    const FIELDS: &'static [FieldRule] = &[
        rule("email", FieldKind::Text, MSG_EMAIL),
        rule("password", FieldKind::Text, MSG_PASSWORD),
    ];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
    #[serde(rename = "fullName")]
    #[validate(length(min = 3, message = "Full name must be at least 3 characters"))]
    pub full_name: String,
    #[serde(rename = "avatarUrl")]
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

impl BodyShape for RegisterRequest {
    const FIELDS: &'static [FieldRule] = &[
        rule("email", FieldKind::Text, MSG_EMAIL),
        rule("password", FieldKind::Text, MSG_PASSWORD),
        rule("fullName", FieldKind::Text, MSG_FULL_NAME),
        rule("avatarUrl", FieldKind::OptionalText, MSG_AVATAR_URL),
    ];
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            full_name: req.full_name,
            password: req.password,
            avatar_url: req.avatar_url,
        }
    }
}

/// Body of both `POST /posts` and `PATCH /posts/{id}`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostRequest {
    #[validate(length(min = 3, message = "Enter the post title"))]
    pub title: String,
    #[validate(length(min = 10, message = "Enter the post text"))]
    pub text: String,
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl BodyShape for PostRequest {
    const FIELDS: &'static [FieldRule] = &[
        rule("title", FieldKind::Text, MSG_TITLE),
        rule("text", FieldKind::Text, MSG_TEXT),
        rule("tags", FieldKind::Tags, MSG_TAGS),
        rule("imageUrl", FieldKind::OptionalText, MSG_IMAGE_URL),
    ];
}

impl From<PostRequest> for PostDraft {
    fn from(req: PostRequest) -> Self {
        Self {
            title: req.title,
            text: req.text,
            tags: req.tags,
            image_url: req.image_url.filter(|url| !url.is_empty()),
        }
    }
}

/// JSON body extractor that type-checks fields and runs the body's validation rules
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + BodyShape,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(mut body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;

        let object = body
            .as_object_mut()
            .ok_or_else(|| Error::BadRequest("Expected a JSON object".to_string()))?;
        let mut fields = check_shape(object, T::FIELDS);

        let value: T =
            serde_json::from_value(body).map_err(|e| Error::BadRequest(e.to_string()))?;

        if let Err(errors) = value.validate() {
            // A dropped field defaults to empty; keep only its type message
            let mistyped: HashSet<String> = fields.iter().map(|f| field_key(&f.field)).collect();
            fields.extend(
                field_errors(&errors)
                    .into_iter()
                    .filter(|f| !mistyped.contains(&field_key(&f.field))),
            );
        }

        if fields.is_empty() {
            Ok(Self(value))
        } else {
            fields.sort_by(|a, b| a.field.cmp(&b.field));
            Err(Error::Validation(fields))
        }
    }
}
