use serde::Deserialize;

/// Generic list envelope shared by every YouTube Data API v3 endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// One hit from search.list.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultId {
    pub kind: String,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    pub title: Option<String>,
}

/// One channel resource from channels.list with
/// part=snippet,statistics,brandingSettings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelResource {
    pub id: String,
    #[serde(default)]
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
    #[serde(rename = "brandingSettings", default)]
    pub branding_settings: BrandingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "customUrl")]
    pub custom_url: Option<String>,
    #[serde(rename = "defaultLanguage")]
    pub default_language: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// The API returns statistics counters as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    pub video_count: Option<String>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
}

impl ChannelStatistics {
    pub fn subscribers(&self) -> u64 {
        parse_count(self.subscriber_count.as_deref())
    }

    pub fn videos(&self) -> u64 {
        parse_count(self.video_count.as_deref())
    }

    pub fn views(&self) -> u64 {
        parse_count(self.view_count.as_deref())
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandingSettings {
    #[serde(default)]
    pub channel: BrandingChannel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandingChannel {
    /// Comma-separated free-text keyword list.
    pub keywords: Option<String>,
}

impl BrandingChannel {
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|k| k.trim().trim_matches('"').to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    pub fn best_url(&self) -> Option<&str> {
        self.medium
            .as_ref()
            .or(self.high.as_ref())
            .map(|t| t.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// One video resource from videos.list (chart=mostPopular).
#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    pub id: String,
    #[serde(default)]
    pub snippet: VideoSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    pub title: Option<String>,
}

/// One playlist from playlists.list.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResource {
    pub id: String,
}

/// One item from playlistItems.list.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemResource {
    #[serde(default)]
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistItemSnippet {
    #[serde(rename = "videoOwnerChannelId")]
    pub video_owner_channel_id: Option<String>,
}

/// One thread from commentThreads.list.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentThreadResource {
    #[serde(default)]
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    pub top_level_comment: Option<TopLevelComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopLevelComment {
    #[serde(default)]
    pub snippet: CommentSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentSnippet {
    #[serde(rename = "authorChannelId")]
    pub author_channel_id: Option<AuthorChannelId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorChannelId {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_parse_string_counters() {
        let stats = ChannelStatistics {
            subscriber_count: Some("12500".to_string()),
            video_count: Some("341".to_string()),
            view_count: None,
        };
        assert_eq!(stats.subscribers(), 12_500);
        assert_eq!(stats.videos(), 341);
        assert_eq!(stats.views(), 0);
    }

    #[test]
    fn branding_keywords_split_and_trim() {
        let branding = BrandingChannel {
            keywords: Some("sri lanka, \"colombo vlog\" , , travel".to_string()),
        };
        assert_eq!(
            branding.keyword_list(),
            vec!["sri lanka", "colombo vlog", "travel"]
        );
    }
}
