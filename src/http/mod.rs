pub mod error;
pub mod session;
pub mod traits;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    model::{
        Notification, NotificationId, Page, Playlist, PlaylistDraft, PlaylistId, SearchResults,
        Song, SongDraft, SongId, User, UserId,
    },
};

pub use error::ApiError;
pub use session::{KeyringVault, MemoryVault, SessionStore, TokenVault};
pub use traits::{NotificationApi, SocialApi};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct OrderBody<'a> {
    song_ids: &'a [SongId],
}

#[derive(Debug, Deserialize)]
struct CountBody {
    #[serde(alias = "likes_count", alias = "saves_count", alias = "unread")]
    count: u32,
}

#[derive(Debug, Deserialize)]
struct ShareBody {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error", alias = "detail")]
    message: String,
}

pub struct ApiService {
    client: Client,
    base_url: String,
    web_url: String,
    pub session: SessionStore,
}

impl ApiService {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        session.restore(config.token.clone());

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            web_url: config.web_url.clone(),
            session,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?;
        debug!(url = url.as_str(), status = status.as_u16(), "api_response");

        if status.is_success() {
            return Ok(body.to_vec());
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(url),
            _ => {
                let message = serde_json::from_slice::<ErrorBody>(&body)
                    .map(|b| b.message)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
                warn!(status = status.as_u16(), message = message.as_str(), "api_error");
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                }
            }
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fire(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.execute(builder).await.map(|_| ())
    }

    // Auth

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let auth: AuthResponse = self
            .fetch(
                self.request(Method::POST, "auth/login")
                    .json(&LoginBody { email, password }),
            )
            .await?;
        info!(user = auth.user.username.as_str(), "signed_in");
        self.session.begin(auth.token);
        Ok(auth.user)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let auth: AuthResponse = self
            .fetch(
                self.request(Method::POST, "auth/register")
                    .json(&RegisterBody {
                        username,
                        email,
                        password,
                    }),
            )
            .await?;
        info!(user = auth.user.username.as_str(), "registered");
        self.session.begin(auth.token);
        Ok(auth.user)
    }

    /// The local session ends even when the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.fire(self.request(Method::POST, "auth/logout")).await;
        self.session.end();
        result
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        if !self.session.is_authenticated() {
            return Err(ApiError::MissingSession);
        }
        self.fetch(self.request(Method::GET, "auth/me")).await
    }

    // Users

    pub async fn fetch_user(&self, id: &UserId) -> Result<User, ApiError> {
        self.fetch(self.request(Method::GET, &format!("users/{id}")))
            .await
    }

    pub async fn fetch_user_playlists(&self, id: &UserId) -> Result<Vec<Playlist>, ApiError> {
        self.fetch(self.request(Method::GET, &format!("users/{id}/playlists")))
            .await
    }

    // Playlists

    pub async fn fetch_my_playlists(&self) -> Result<Vec<Playlist>, ApiError> {
        self.fetch(self.request(Method::GET, "playlists/mine")).await
    }

    pub async fn fetch_saved_playlists(&self) -> Result<Vec<Playlist>, ApiError> {
        self.fetch(self.request(Method::GET, "playlists/saved")).await
    }

    pub async fn fetch_playlist(&self, id: &PlaylistId) -> Result<Playlist, ApiError> {
        self.fetch(self.request(Method::GET, &format!("playlists/{id}")))
            .await
    }

    pub async fn create_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist, ApiError> {
        self.fetch(self.request(Method::POST, "playlists").json(draft))
            .await
    }

    pub async fn update_playlist(
        &self,
        id: &PlaylistId,
        draft: &PlaylistDraft,
    ) -> Result<Playlist, ApiError> {
        self.fetch(
            self.request(Method::PATCH, &format!("playlists/{id}"))
                .json(draft),
        )
        .await
    }

    pub async fn delete_playlist(&self, id: &PlaylistId) -> Result<(), ApiError> {
        self.fire(self.request(Method::DELETE, &format!("playlists/{id}")))
            .await
    }

    pub async fn add_song(&self, id: &PlaylistId, draft: &SongDraft) -> Result<Song, ApiError> {
        if !draft.is_valid() {
            return Err(ApiError::Invalid(format!("not a valid link: {}", draft.url)));
        }
        self.fetch(
            self.request(Method::POST, &format!("playlists/{id}/songs"))
                .json(draft),
        )
        .await
    }

    /// Server-side share link, or the web app's public URL when the server has none.
    pub async fn share_playlist(&self, id: &PlaylistId) -> Result<String, ApiError> {
        let body: ShareBody = self
            .fetch(self.request(Method::POST, &format!("playlists/{id}/share")))
            .await?;
        Ok(body.url.unwrap_or_else(|| self.public_link(id)))
    }

    pub fn public_link(&self, id: &PlaylistId) -> String {
        format!("{}/playlist/{id}", self.web_url)
    }

    // Feed, discover & search

    pub async fn fetch_feed(&self, page: u32, limit: u32) -> Result<Page<Playlist>, ApiError> {
        let body = self
            .fetch(
                self.request(Method::GET, "feed")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await?;
        Ok(requested(body, page))
    }

    pub async fn fetch_discover(&self, page: u32, limit: u32) -> Result<Page<Playlist>, ApiError> {
        let body = self
            .fetch(
                self.request(Method::GET, "discover")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await?;
        Ok(requested(body, page))
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }
        self.fetch(self.request(Method::GET, "search").query(&[("q", query)]))
            .await
    }

    // Notifications

    pub async fn fetch_notifications(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Page<Notification>, ApiError> {
        let body = self
            .fetch(
                self.request(Method::GET, "notifications")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await?;
        Ok(requested(body, page))
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        self.fire(self.request(Method::POST, &format!("notifications/{id}/read")))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.fire(self.request(Method::POST, "notifications/read-all"))
            .await
    }
}

/// Labels a page with the number we asked for; servers don't always echo it.
fn requested<T>(mut body: Page<T>, page: u32) -> Page<T> {
    body.page = page;
    body
}

#[async_trait]
impl SocialApi for ApiService {
    async fn set_liked(&self, id: &PlaylistId, liked: bool) -> Result<u32, ApiError> {
        let method = if liked { Method::POST } else { Method::DELETE };
        let body: CountBody = self
            .fetch(self.request(method, &format!("playlists/{id}/like")))
            .await?;
        Ok(body.count)
    }

    async fn set_saved(&self, id: &PlaylistId, saved: bool) -> Result<u32, ApiError> {
        let method = if saved { Method::POST } else { Method::DELETE };
        let body: CountBody = self
            .fetch(self.request(method, &format!("playlists/{id}/save")))
            .await?;
        Ok(body.count)
    }

    async fn reorder_songs(&self, id: &PlaylistId, order: &[SongId]) -> Result<(), ApiError> {
        self.fire(
            self.request(Method::PUT, &format!("playlists/{id}/songs/order"))
                .json(&OrderBody { song_ids: order }),
        )
        .await
    }

    async fn remove_song(&self, id: &PlaylistId, song: &SongId) -> Result<(), ApiError> {
        self.fire(self.request(Method::DELETE, &format!("playlists/{id}/songs/{song}")))
            .await
    }

    async fn set_following(&self, user: &UserId, following: bool) -> Result<(), ApiError> {
        let method = if following {
            Method::POST
        } else {
            Method::DELETE
        };
        self.fire(self.request(method, &format!("users/{user}/follow")))
            .await
    }
}

#[async_trait]
impl NotificationApi for ApiService {
    async fn unread_count(&self) -> Result<u32, ApiError> {
        let body: CountBody = self
            .fetch(self.request(Method::GET, "notifications/unread-count"))
            .await?;
        Ok(body.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::session::MemoryVault;

    fn service(api_url: &str) -> ApiService {
        let config = Config {
            api_url: api_url.to_string(),
            ..Config::default()
        };
        ApiService::new(&config, SessionStore::new(Box::new(MemoryVault::default()))).unwrap()
    }

    #[test]
    fn pages_carry_the_requested_number() {
        let body: Page<u32> = serde_json::from_str(r#"{"items": [1, 2]}"#).unwrap();
        assert_eq!(requested(body, 3).page, 3);
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        let api = service("https://api.example.com/v1");
        assert_eq!(api.url("/feed"), "https://api.example.com/v1/feed");
        assert_eq!(api.url("feed"), "https://api.example.com/v1/feed");
    }

    #[test]
    fn public_link_uses_web_url() {
        let api = service("https://api.example.com");
        assert_eq!(
            api.public_link(&PlaylistId::from("p9")),
            format!("{}/playlist/p9", crate::config::DEFAULT_WEB_URL)
        );
    }

    #[tokio::test]
    async fn empty_search_skips_the_network() {
        let api = service("http://127.0.0.1:9");
        let results = api.search("   ").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn current_user_requires_session() {
        let api = service("http://127.0.0.1:9");
        assert!(matches!(
            api.current_user().await,
            Err(ApiError::MissingSession)
        ));
    }

    #[test]
    fn count_body_accepts_named_fields() {
        let a: CountBody = serde_json::from_str(r#"{"likes_count": 4}"#).unwrap();
        let b: CountBody = serde_json::from_str(r#"{"count": 2}"#).unwrap();
        assert_eq!((a.count, b.count), (4, 2));
    }
}
