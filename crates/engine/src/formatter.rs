//! Feed item → chat notification formatting.
//!
//! Produces the text relayed to the webhook:
//!
//! ```text
//! <permalink>
//! <author-link> tweeted|retweeted:
//! [<original author link>]
//! <body with expanded links>
//! ```
//!
//! Formatting never fails: entities with missing fields are skipped and the
//! short link is left in place.

use relay_common::types::{Entities, Notification, RawItem};

/// Default site used for permalinks and profile links.
pub const DEFAULT_SITE_URL: &str = "https://twitter.com";

/// Pure formatter turning raw feed items into notifications.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    site_url: String,
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self::with_site_url(DEFAULT_SITE_URL)
    }

    pub fn with_site_url(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Format one item.
    ///
    /// For a repost the permalink and body come from the reposted original and
    /// an attribution line naming its author is inserted before the body.
    pub fn format(&self, item: &RawItem) -> Notification {
        let canonical = item.canonical();
        let author = &item.user;

        let permalink = format!(
            "{}/{}/status/{}",
            self.site_url, canonical.user.screen_name, canonical.id
        );
        let author_link = format!(
            "<{}/@{}|@{} ({})>",
            self.site_url, author.screen_name, author.name, author.screen_name
        );

        let (verb, attribution) = if item.is_repost() {
            let original = &canonical.user;
            (
                "retweeted",
                format!(
                    "<{}/@{}|{} @{}>\n",
                    self.site_url, original.screen_name, original.name, original.screen_name
                ),
            )
        } else {
            ("tweeted", String::new())
        };

        let mut replacements = link_replacements(&canonical.entities);
        if item.is_repost() {
            replacements.extend(link_replacements(&item.entities));
        }
        let body = rewrite_links(&canonical.text, &replacements);

        let text = format!("{permalink}\n{author_link} {verb}:\n{attribution}{body}");
        tracing::debug!(id = item.id, text = %text, "Formatted item");
        Notification::new(text)
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect `(short, replacement)` pairs: link entities first, then media.
pub fn link_replacements(entities: &Entities) -> Vec<(String, String)> {
    let links = entities.urls.iter().filter_map(|entity| {
        let expanded = non_blank(entity.expanded_url.as_deref())?;
        let short = non_blank(entity.url.as_deref())?;
        let display = non_blank(entity.display_url.as_deref()).unwrap_or(expanded);
        Some((short.to_string(), format!("<{expanded}|{display}>")))
    });

    let media = entities.media.iter().filter_map(|entity| {
        let direct = non_blank(entity.media_url_https.as_deref())
            .or_else(|| non_blank(entity.media_url.as_deref()))?;
        let short = non_blank(entity.url.as_deref())?;
        Some((short.to_string(), direct.to_string()))
    });

    links.chain(media).collect()
}

/// Replace every occurrence of each short link, in order.
pub fn rewrite_links(text: &str, replacements: &[(String, String)]) -> String {
    replacements
        .iter()
        .fold(text.to_string(), |acc, (short, replacement)| {
            acc.replace(short.as_str(), replacement)
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
