use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{Identified, string_id};

string_id!(SongId);

const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "ogg", "flac", "wav", "m4a", "aac", "opus"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "yt")]
    YouTube,
    Spotify,
    SoundCloud,
    #[serde(rename = "apple")]
    AppleMusic,
    Deezer,
    Bandcamp,
    Direct,
    #[default]
    #[serde(other)]
    Other,
}

impl Platform {
    pub fn detect(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return Platform::Other;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return Platform::Other;
        }

        let host = parsed
            .host_str()
            .unwrap_or_default()
            .trim_start_matches("www.")
            .trim_start_matches("m.")
            .to_ascii_lowercase();

        match host.as_str() {
            "youtube.com" | "youtu.be" | "music.youtube.com" | "youtube-nocookie.com" => {
                Platform::YouTube
            }
            "open.spotify.com" | "spotify.com" => Platform::Spotify,
            "soundcloud.com" | "on.soundcloud.com" => Platform::SoundCloud,
            "music.apple.com" => Platform::AppleMusic,
            "deezer.com" | "deezer.page.link" => Platform::Deezer,
            h if h == "bandcamp.com" || h.ends_with(".bandcamp.com") => Platform::Bandcamp,
            _ if has_audio_extension(&parsed) => Platform::Direct,
            _ => Platform::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Spotify => "Spotify",
            Platform::SoundCloud => "SoundCloud",
            Platform::AppleMusic => "Apple Music",
            Platform::Deezer => "Deezer",
            Platform::Bandcamp => "Bandcamp",
            Platform::Direct => "Audio",
            Platform::Other => "Link",
        }
    }

    /// Only plain audio files can be decoded locally; everything else plays
    /// through the platform's own embed.
    pub fn is_streamable(&self) -> bool {
        matches!(self, Platform::Direct)
    }

    pub fn embed_url(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url.trim()).ok()?;
        match self {
            Platform::YouTube => youtube_video_id(&parsed)
                .map(|id| format!("https://www.youtube.com/embed/{id}")),
            Platform::Spotify => {
                let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
                let mut kind = segments.next()?;
                if kind.starts_with("intl-") {
                    kind = segments.next()?;
                }
                let id = segments.next()?;
                Some(format!("https://open.spotify.com/embed/{kind}/{id}"))
            }
            Platform::SoundCloud => {
                let mut player = Url::parse("https://w.soundcloud.com/player/").ok()?;
                player.query_pairs_mut().append_pair("url", parsed.as_str());
                Some(player.to_string())
            }
            Platform::Direct => Some(parsed.to_string()),
            _ => None,
        }
    }
}

fn has_audio_extension(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut s| s.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .is_some_and(|(_, ext)| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn youtube_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.");
    if host == "youtu.be" {
        return url
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        return Some(v.into_owned());
    }

    let mut segments = url.path_segments()?;
    match segments.next()? {
        "embed" | "shorts" | "live" => segments.next().map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    pub url: String,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl Song {
    /// The server-provided platform wins; otherwise it is derived from the url.
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(|| Platform::detect(&self.url))
    }

    pub fn artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown artist")
    }

    pub fn embed_url(&self) -> Option<String> {
        self.platform().embed_url(&self.url)
    }
}

impl Identified for Song {
    type Id = SongId;

    fn id(&self) -> SongId {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SongDraft {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl SongDraft {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().to_string(),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        Url::parse(&self.url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_platform_by_host() {
        assert_eq!(
            Platform::detect("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Platform::YouTube
        );
        assert_eq!(Platform::detect("https://youtu.be/dQw4w9WgXcQ"), Platform::YouTube);
        assert_eq!(
            Platform::detect("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"),
            Platform::Spotify
        );
        assert_eq!(
            Platform::detect("https://soundcloud.com/artist/some-track"),
            Platform::SoundCloud
        );
        assert_eq!(
            Platform::detect("https://artist.bandcamp.com/track/tune"),
            Platform::Bandcamp
        );
        assert_eq!(
            Platform::detect("https://cdn.example.com/audio/Song.MP3"),
            Platform::Direct
        );
        assert_eq!(Platform::detect("https://example.com/page"), Platform::Other);
        assert_eq!(Platform::detect("not a url"), Platform::Other);
        assert_eq!(Platform::detect("ftp://host/song.mp3"), Platform::Other);
    }

    #[test]
    fn builds_embed_urls() {
        assert_eq!(
            Platform::YouTube.embed_url("https://www.youtube.com/watch?v=abc123&t=10"),
            Some("https://www.youtube.com/embed/abc123".to_string())
        );
        assert_eq!(
            Platform::YouTube.embed_url("https://youtu.be/abc123"),
            Some("https://www.youtube.com/embed/abc123".to_string())
        );
        assert_eq!(
            Platform::Spotify.embed_url("https://open.spotify.com/intl-de/track/xyz"),
            Some("https://open.spotify.com/embed/track/xyz".to_string())
        );
        let sc = Platform::SoundCloud
            .embed_url("https://soundcloud.com/a/b")
            .unwrap();
        assert!(sc.starts_with("https://w.soundcloud.com/player/?url=https%3A%2F%2Fsoundcloud.com"));
        assert_eq!(Platform::Other.embed_url("https://example.com"), None);
    }

    #[test]
    fn server_platform_overrides_detection() {
        let song: Song = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "title": "Tune",
            "url": "https://example.com/x",
            "platform": "soundcloud"
        }))
        .unwrap();
        assert_eq!(song.platform(), Platform::SoundCloud);

        let unknown: Song = serde_json::from_value(serde_json::json!({
            "id": "s2",
            "title": "Tune",
            "url": "https://youtu.be/x",
            "platform": "myspace"
        }))
        .unwrap();
        assert_eq!(unknown.platform(), Platform::Other);

        let missing: Song = serde_json::from_value(serde_json::json!({
            "id": "s3",
            "title": "Tune",
            "url": "https://youtu.be/x"
        }))
        .unwrap();
        assert_eq!(missing.platform(), Platform::YouTube);
    }

    #[test]
    fn song_draft_requires_http_url() {
        assert!(SongDraft::new(" https://youtu.be/x ").is_valid());
        assert!(!SongDraft::new("javascript:alert(1)").is_valid());
        assert!(!SongDraft::new("").is_valid());
    }
}
