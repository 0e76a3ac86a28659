use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{ArticleFields, ArticleId, Revision, Role};

const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y at %-I:%M %p";

/// Structured article representation served by `GET <path>?json=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: ArticleId,
    #[serde(rename = "_rev", default, skip_serializing_if = "is_unwritten")]
    pub rev: Revision,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author", default)]
    pub author: String,
    #[serde(rename = "Markdown")]
    pub markdown: String,
    #[serde(rename = "Public", default)]
    pub public: bool,
    #[serde(rename = "History", default, deserialize_with = "null_as_empty")]
    pub history: Vec<HistoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author", default)]
    pub author: String,
    #[serde(rename = "HistoryBodyID")]
    pub history_body_id: String,
}

fn is_unwritten(rev: &Revision) -> bool {
    rev.is_unwritten()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryItem>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Article {
    pub fn fields(&self) -> ArticleFields {
        ArticleFields {
            title: self.title.clone(),
            markdown: self.markdown.clone(),
            public: self.public,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self
            .history
            .first()
            .map(|item| item.date.as_str())
            .unwrap_or(self.date.as_str());
        parse_date(raw)
    }

    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_date(&self.date)
    }

    pub fn to_update(&self) -> ArticleUpdateForm {
        ArticleUpdateForm {
            rev: self.rev.clone(),
            title: self.title.clone(),
            markdown: self.markdown.clone(),
            public: self.public,
        }
    }
}

pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

pub fn format_display_date(date: &DateTime<FixedOffset>) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Form body of `PUT <path>`. The revision is the one last observed by the
/// client; the server rejects the write when it no longer matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleUpdateForm {
    #[serde(rename = "_rev", default)]
    pub rev: Revision,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Markdown")]
    pub markdown: String,
    #[serde(rename = "Public")]
    pub public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutArticleResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
    #[serde(default)]
    pub conflict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub assertion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangeForm {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Role")]
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangeResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
