//! Blog data models
//!
//! `*Row` types mirror the database tables; the serialisable types are what
//! handlers return to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;

/// User record stored in database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public user info (no sensitive data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

/// A post with its author expanded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub views_count: i64,
    pub user: UserInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row produced by joining `posts` with its owning `users` row
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub text: String,
    pub tags: Json<Vec<String>>,
    pub image_url: Option<String>,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
    pub user_full_name: String,
    pub user_email: String,
    pub user_avatar_url: Option<String>,
    pub user_created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            tags: row.tags.0,
            image_url: row.image_url,
            views_count: row.views_count,
            user: UserInfo {
                id: row.user_id,
                full_name: row.user_full_name,
                email: row.user_email,
                avatar_url: row.user_avatar_url,
                created_at: row.user_created_at,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields a client supplies when creating or replacing a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

/// Accepts `["a", "b"]`, `"a,b"` or `null`.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<TagsInput>::deserialize(deserializer)? {
        None => return Ok(Vec::new()),
        Some(TagsInput::List(tags)) => tags,
        Some(TagsInput::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(raw
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_tags")]
        tags: Vec<String>,
    }

    fn tags_of(json: &str) -> Vec<String> {
        serde_json::from_str::<Holder>(json).unwrap().tags
    }

    #[test]
    fn test_tags_from_list_and_csv() {
        assert_eq!(tags_of(r#"{"tags": ["rust", " web "]}"#), vec!["rust", "web"]);
        assert_eq!(tags_of(r#"{"tags": "rust, web,,"}"#), vec!["rust", "web"]);
    }

    #[test]
    fn test_tags_missing_or_null() {
        assert!(tags_of("{}").is_empty());
        assert!(tags_of(r#"{"tags": null}"#).is_empty());
    }

    #[test]
    fn test_tags_wrong_type_is_rejected() {
        assert!(serde_json::from_str::<Holder>(r#"{"tags": 42}"#).is_err());
    }

    #[test]
    fn test_user_info_hides_password_and_uses_wire_names() {
        let user = User {
            id: "u1".into(),
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$2b$04$hash".into(),
            avatar_url: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserInfo::from(user)).unwrap();
        assert_eq!(json["_id"], "u1");
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
