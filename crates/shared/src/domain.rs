use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};

macro_rules! token_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

token_newtype!(ArticleId);
token_newtype!(Revision);

pub const INDEX_ARTICLE: &str = "index";

impl ArticleId {
    /// Parses a resource path such as `/release-notes`. The bare root maps to
    /// the index article.
    pub fn from_path(path: &str) -> Result<Self, ApiError> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("article path must start with '/': {path}"),
            ));
        };

        let legal = rest
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !legal {
            return Err(ApiError::new(
                ErrorCode::Validation,
                format!("invalid article path: {path}"),
            ));
        }

        if rest.is_empty() {
            Ok(Self(INDEX_ARTICLE.to_string()))
        } else {
            Ok(Self(rest.to_string()))
        }
    }

    pub fn resource_path(&self) -> String {
        if self.0 == INDEX_ARTICLE {
            "/".to_string()
        } else {
            format!("/{}", self.0)
        }
    }

    pub fn is_index(&self) -> bool {
        self.0 == INDEX_ARTICLE
    }
}

impl Revision {
    /// Articles that were never written have no revision yet.
    pub fn is_unwritten(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Pending,
    Read,
    Write,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Pending, Role::Read, Role::Write, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Pending => "Pending",
            Role::Read => "Read",
            Role::Write => "Write",
            Role::Admin => "Admin",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                read: true,
                write: true,
                admin: true,
            },
            Role::Write => Capabilities {
                read: true,
                write: true,
                admin: false,
            },
            Role::Read => Capabilities {
                read: true,
                write: false,
                admin: false,
            },
            Role::Pending => Capabilities::default(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ApiError::new(ErrorCode::Validation, format!("unknown role: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
    pub admin: bool,
}

/// Who is acting and what the UI may offer them. Requests are still
/// authorized server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub email: Option<String>,
    pub capabilities: Capabilities,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: Some(email.into()),
            capabilities: role.capabilities(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.email.as_deref().is_some_and(|email| !email.is_empty())
    }

    pub fn can_edit(&self) -> bool {
        self.capabilities.write
    }

    pub fn can_administer(&self) -> bool {
        self.capabilities.admin
    }

    pub fn shows_visibility_for(&self, article_id: &ArticleId) -> bool {
        self.is_signed_in() && !article_id.is_index()
    }

    pub fn is_self(&self, email: &str) -> bool {
        self.email.as_deref() == Some(email)
    }
}

/// The user-editable part of an article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleFields {
    pub title: String,
    pub markdown: String,
    pub public: bool,
}
