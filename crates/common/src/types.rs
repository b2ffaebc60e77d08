use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Account that authored a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Handle without the leading `@`
    pub screen_name: String,
    /// Display name
    pub name: String,
}

/// A shortened link embedded in an item's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntity {
    /// Short form as it appears in the text
    #[serde(default)]
    pub url: Option<String>,
    pub expanded_url: Option<String>,
    pub display_url: Option<String>,
}

/// An attached photo or video whose placeholder link appears in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntity {
    /// Short placeholder as it appears in the text
    #[serde(default)]
    pub url: Option<String>,
    pub media_url_https: Option<String>,
    pub media_url: Option<String>,
}

/// Link and media entities of a feed item.
///
/// Both lists default to empty when the feed omits them or sends `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: Vec<UrlEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<MediaEntity>,
}

/// A post as returned by the list timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: u64,
    #[serde(alias = "full_text")]
    pub text: String,
    pub user: Author,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Entities,
    /// The item this one reposts, if any.
    #[serde(default)]
    pub retweeted_status: Option<Box<RawItem>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawItem {
    pub fn is_repost(&self) -> bool {
        self.retweeted_status.is_some()
    }

    /// The item whose content is shown: the reposted original, or the item itself.
    pub fn canonical(&self) -> &RawItem {
        self.retweeted_status.as_deref().unwrap_or(self)
    }
}

/// Human-readable notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
}

impl Notification {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Bearer credential for the feed API.
#[derive(Clone)]
pub struct Credential {
    token: String,
    pub acquired_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            acquired_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}
