use async_trait::async_trait;

use crate::model::{PlaylistId, SongId, UserId};

use super::error::ApiError;

/// The mutating calls behind optimistic updates.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Returns the server's like count after the change.
    async fn set_liked(&self, id: &PlaylistId, liked: bool) -> Result<u32, ApiError>;
    /// Returns the server's save count after the change.
    async fn set_saved(&self, id: &PlaylistId, saved: bool) -> Result<u32, ApiError>;
    async fn reorder_songs(&self, id: &PlaylistId, order: &[SongId]) -> Result<(), ApiError>;
    async fn remove_song(&self, id: &PlaylistId, song: &SongId) -> Result<(), ApiError>;
    async fn set_following(&self, user: &UserId, following: bool) -> Result<(), ApiError>;
}

#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn unread_count(&self) -> Result<u32, ApiError>;
}
