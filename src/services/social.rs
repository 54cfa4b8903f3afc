use tracing::{info, warn};

use crate::{
    http::{ApiError, ApiService, SocialApi},
    model::PlaylistId,
    store::{Confirmation, Mutation},
};

/// Sends the request that makes an optimistic mutation permanent.
pub async fn commit(api: &dyn SocialApi, mutation: &Mutation) -> Result<Confirmation, ApiError> {
    let result = match mutation {
        Mutation::Like { playlist, liked } => {
            api.set_liked(playlist, *liked).await.map(Confirmation::Count)
        }
        Mutation::Save { playlist, saved } => {
            api.set_saved(playlist, *saved).await.map(Confirmation::Count)
        }
        Mutation::Reorder { playlist, order } => api
            .reorder_songs(playlist, order)
            .await
            .map(|_| Confirmation::Done),
        Mutation::RemoveSong { playlist, song } => api
            .remove_song(playlist, song)
            .await
            .map(|_| Confirmation::Done),
        Mutation::Follow { user, following } => api
            .set_following(user, *following)
            .await
            .map(|_| Confirmation::Done),
    };

    match &result {
        Ok(_) => info!(?mutation, "mutation_committed"),
        Err(e) => warn!(?mutation, error = %e, "mutation_rejected"),
    }
    result
}

/// The link to hand out for a playlist. Falls back to the public web page
/// when the server won't mint one.
pub async fn share_link(api: &ApiService, id: &PlaylistId) -> String {
    match api.share_playlist(id).await {
        Ok(url) => url,
        Err(e) => {
            warn!(playlist_id = %id, error = %e, "share_failed");
            api.public_link(id)
        }
    }
}

/// Moves the element at `from` to `to`. Returns false when nothing moved.
pub fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        model::{PlaylistId, SongId, UserId},
        store::{AppData, fixtures::playlist},
    };

    #[derive(Default)]
    struct FakeApi {
        reject: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::default()
            }
        }

        fn answer<T>(&self, call: String, value: T) -> Result<T, ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.reject {
                Err(ApiError::Status {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl SocialApi for FakeApi {
        async fn set_liked(&self, id: &PlaylistId, liked: bool) -> Result<u32, ApiError> {
            self.answer(format!("like {id} {liked}"), 42)
        }

        async fn set_saved(&self, id: &PlaylistId, saved: bool) -> Result<u32, ApiError> {
            self.answer(format!("save {id} {saved}"), 7)
        }

        async fn reorder_songs(&self, id: &PlaylistId, order: &[SongId]) -> Result<(), ApiError> {
            self.answer(format!("reorder {id} {}", order.len()), ())
        }

        async fn remove_song(&self, id: &PlaylistId, song: &SongId) -> Result<(), ApiError> {
            self.answer(format!("remove {id} {song}"), ())
        }

        async fn set_following(&self, user: &UserId, following: bool) -> Result<(), ApiError> {
            self.answer(format!("follow {user} {following}"), ())
        }
    }

    #[tokio::test]
    async fn rejected_like_round_trip_restores_store() {
        let api = FakeApi::rejecting();
        let mut data = AppData::default();
        data.upsert_playlist(playlist("p", &[]));
        let before = data.playlist(&"p".into()).unwrap().clone();

        let pending = data
            .begin_mutation(Mutation::toggle_like(&before))
            .unwrap();
        let result = commit(&api, &pending.mutation)
            .await
            .map_err(|e| e.to_string());
        assert!(data.settle_mutation(pending, result).is_err());

        assert_eq!(data.playlist(&"p".into()).unwrap(), &before);
        assert_eq!(api.calls.lock().unwrap().as_slice(), ["like p true"]);
    }

    #[tokio::test]
    async fn accepted_save_takes_server_count() {
        let api = FakeApi::default();
        let mut data = AppData::default();
        data.upsert_playlist(playlist("p", &[]));

        let pending = data
            .begin_mutation(Mutation::Save {
                playlist: "p".into(),
                saved: true,
            })
            .unwrap();
        let result = commit(&api, &pending.mutation)
            .await
            .map_err(|e| e.to_string());
        data.settle_mutation(pending, result).unwrap();

        let p = data.playlist(&"p".into()).unwrap();
        assert!(p.is_saved);
        assert_eq!(p.saves_count, 7);
        assert_eq!(data.saved, vec![PlaylistId::from("p")]);
    }

    #[test]
    fn reorder_moves_one_element() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        assert!(reorder(&mut v, 0, 2));
        assert_eq!(v, ['b', 'c', 'a', 'd']);
        assert!(reorder(&mut v, 3, 0));
        assert_eq!(v, ['d', 'b', 'c', 'a']);
        assert!(!reorder(&mut v, 1, 1));
        assert!(!reorder(&mut v, 4, 0));
    }
}
