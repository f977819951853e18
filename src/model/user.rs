use super::common::{Meta, ObjectKind};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A workspace member or integration.
///
/// The `type` tag alone selects the payload; a bot that happens to carry an
/// `email` field is still a bot. Bare references (`{"object": "user",
/// "id": ...}`) decode with `kind == None`. An unknown tag or a malformed
/// payload fails the decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(flatten)]
    pub kind: Option<UserKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Header {
            #[serde(flatten)]
            meta: Meta,
            #[serde(default)]
            name: Option<String>,
            #[serde(default)]
            avatar_url: Option<String>,
        }

        let raw = Value::deserialize(deserializer)?;
        let kind = match raw.get("type") {
            None | Some(Value::Null) => None,
            Some(_) => {
                Some(UserKind::deserialize(&raw).map_err(<D::Error as de::Error>::custom)?)
            }
        };
        let header = Header::deserialize(&raw).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self {
            meta: header.meta,
            kind,
            name: header.name,
            avatar_url: header.avatar_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserKind {
    Person {
        #[serde(default)]
        person: Person,
    },
    Bot {
        #[serde(default)]
        bot: Bot,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<BotOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
}

/// Who installed a bot: the whole workspace or a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotOwner {
    Workspace {
        #[serde(default)]
        workspace: bool,
    },
    User { user: Box<User> },
}

impl User {
    pub fn person(id: impl Into<String>, name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            meta: Meta::new(ObjectKind::User, id),
            kind: Some(UserKind::Person {
                person: Person { email },
            }),
            name: Some(name.into()),
            avatar_url: None,
        }
    }

    pub fn bot(id: impl Into<String>, name: impl Into<String>, bot: Bot) -> Self {
        Self {
            meta: Meta::new(ObjectKind::User, id),
            kind: Some(UserKind::Bot { bot }),
            name: Some(name.into()),
            avatar_url: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.kind, Some(UserKind::Bot { .. }))
    }

    pub fn is_person(&self) -> bool {
        matches!(self.kind, Some(UserKind::Person { .. }))
    }

    pub fn email(&self) -> Option<&str> {
        match &self.kind {
            Some(UserKind::Person { person }) => person.email.as_deref(),
            _ => None,
        }
    }

    pub fn bot_details(&self) -> Option<&Bot> {
        match &self.kind {
            Some(UserKind::Bot { bot }) => Some(bot),
            _ => None,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())?;
        if let Some(email) = self.email().filter(|e| !e.is_empty()) {
            write!(f, " <{}>", email)?;
        }
        Ok(())
    }
}
