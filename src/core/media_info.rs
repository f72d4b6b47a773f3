//! Media metadata returned by a probe

use serde::Deserialize;

/// Metadata for a video or a playlist, as reported by the fetch tool.
///
/// Only the fields the downloader displays are kept; everything else in
/// the tool's JSON is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaMetadata {
    /// Platform identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Video or playlist title
    #[serde(default)]
    pub title: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Playlist entries, present only for playlists
    #[serde(default)]
    pub entries: Option<Vec<serde_json::Value>>,
    /// Entry count reported alongside `entries`
    #[serde(default)]
    pub playlist_count: Option<u64>,
}

impl MediaMetadata {
    /// Title or a placeholder
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Unknown")
    }

    /// Duration in whole seconds, 0 when unknown
    pub fn duration_secs(&self) -> u64 {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as u64)
            .unwrap_or(0)
    }

    /// Whether the probe described a playlist
    pub fn is_playlist(&self) -> bool {
        self.entries.is_some()
    }

    /// Number of playlist entries, `None` for single videos
    pub fn entry_count(&self) -> Option<usize> {
        self.entries.as_ref().map(|entries| entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_video() {
        let json = r#"{"id":"7300000000000000000","title":"Cats","duration":15.4,"ext":"mp4"}"#;
        let metadata: MediaMetadata = serde_json::from_str(json).unwrap();

        assert_eq!(metadata.id.as_deref(), Some("7300000000000000000"));
        assert_eq!(metadata.display_title(), "Cats");
        assert_eq!(metadata.duration_secs(), 15);
        assert!(!metadata.is_playlist());
        assert_eq!(metadata.entry_count(), None);
    }

    #[test]
    fn test_parse_playlist() {
        let json = r#"{"title":"Mix","entries":[{"id":"1"},{"id":"2"},null],"playlist_count":3}"#;
        let metadata: MediaMetadata = serde_json::from_str(json).unwrap();

        assert!(metadata.is_playlist());
        assert_eq!(metadata.entry_count(), Some(3));
        assert_eq!(metadata.playlist_count, Some(3));
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let metadata: MediaMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata.display_title(), "Unknown");
        assert_eq!(metadata.duration_secs(), 0);

        let metadata = MediaMetadata {
            title: Some("  ".to_string()),
            duration: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(metadata.display_title(), "Unknown");
        assert_eq!(metadata.duration_secs(), 0);
    }
}
