//! Local-first mutations.
//!
//! A [`Mutation`] is applied to [`AppData`] before the request is sent. The
//! returned [`Pending`] carries a snapshot of whatever it touched, so a
//! rejected request puts the store back exactly as it was.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::{Playlist, PlaylistId, Song, SongId, User, UserId};

use super::AppData;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Like { playlist: PlaylistId, liked: bool },
    Save { playlist: PlaylistId, saved: bool },
    Reorder { playlist: PlaylistId, order: Vec<SongId> },
    RemoveSong { playlist: PlaylistId, song: SongId },
    Follow { user: UserId, following: bool },
}

impl Mutation {
    pub fn toggle_like(playlist: &Playlist) -> Self {
        Mutation::Like {
            playlist: playlist.id.clone(),
            liked: !playlist.is_liked,
        }
    }

    pub fn toggle_save(playlist: &Playlist) -> Self {
        Mutation::Save {
            playlist: playlist.id.clone(),
            saved: !playlist.is_saved,
        }
    }

    pub fn toggle_follow(user: &User) -> Self {
        Mutation::Follow {
            user: user.id.clone(),
            following: !user.is_following,
        }
    }

    pub(crate) fn key(&self) -> MutationKey {
        match self {
            Mutation::Like { playlist, .. } => MutationKey::Like(playlist.clone()),
            Mutation::Save { playlist, .. } => MutationKey::Save(playlist.clone()),
            Mutation::Reorder { playlist, .. } | Mutation::RemoveSong { playlist, .. } => {
                MutationKey::Songs(playlist.clone())
            }
            Mutation::Follow { user, .. } => MutationKey::Follow(user.clone()),
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Mutation::Like { liked: true, .. } => "like",
            Mutation::Like { liked: false, .. } => "unlike",
            Mutation::Save { saved: true, .. } => "save",
            Mutation::Save { saved: false, .. } => "unsave",
            Mutation::Reorder { .. } => "reorder",
            Mutation::RemoveSong { .. } => "remove a song from",
            Mutation::Follow { following: true, .. } => "follow",
            Mutation::Follow { following: false, .. } => "unfollow",
        }
    }
}

/// Only one request per target and kind may be in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MutationKey {
    Like(PlaylistId),
    Save(PlaylistId),
    Songs(PlaylistId),
    Follow(UserId),
}

#[derive(Debug, Clone)]
enum Snapshot {
    Like {
        liked: bool,
        count: u32,
    },
    Save {
        saved: bool,
        count: u32,
        saved_ids: Vec<PlaylistId>,
    },
    Songs {
        songs: Vec<Song>,
        song_count: u32,
    },
    Follow {
        following: bool,
        followers: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The authoritative like/save count after the change.
    Count(u32),
    Done,
}

#[derive(Debug, Clone)]
pub struct Pending {
    pub id: Uuid,
    pub mutation: Mutation,
    label: String,
    snapshot: Snapshot,
}

impl Pending {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl AppData {
    pub fn has_pending(&self, mutation: &Mutation) -> bool {
        self.in_flight.contains(&mutation.key())
    }

    /// Applies `mutation` locally. Returns `None` when there is nothing to do:
    /// unknown target, no-op change, or the same change is still in flight.
    pub fn begin_mutation(&mut self, mutation: Mutation) -> Option<Pending> {
        let key = mutation.key();
        if self.in_flight.contains(&key) {
            return None;
        }

        let (label, snapshot) = match &mutation {
            Mutation::Like { playlist, liked } => {
                let p = self.playlists.get_mut(playlist)?;
                if p.is_liked == *liked {
                    return None;
                }
                let snapshot = Snapshot::Like {
                    liked: p.is_liked,
                    count: p.likes_count,
                };
                p.is_liked = *liked;
                p.likes_count = bump(p.likes_count, *liked);
                (p.title.clone(), snapshot)
            }
            Mutation::Save { playlist, saved } => {
                let p = self.playlists.get_mut(playlist)?;
                if p.is_saved == *saved {
                    return None;
                }
                let snapshot = Snapshot::Save {
                    saved: p.is_saved,
                    count: p.saves_count,
                    saved_ids: self.saved.clone(),
                };
                p.is_saved = *saved;
                p.saves_count = bump(p.saves_count, *saved);
                let label = p.title.clone();

                self.saved.retain(|id| id != playlist);
                if *saved {
                    self.saved.insert(0, playlist.clone());
                }
                (label, snapshot)
            }
            Mutation::Reorder { playlist, order } => {
                let p = self.playlists.get_mut(playlist)?;
                let current: Vec<&SongId> = p.songs.iter().map(|s| &s.id).collect();
                if !is_permutation(&current, order) || current.iter().copied().eq(order.iter()) {
                    return None;
                }
                let snapshot = Snapshot::Songs {
                    songs: p.songs.clone(),
                    song_count: p.song_count,
                };
                p.songs
                    .sort_by_key(|s| order.iter().position(|id| *id == s.id));
                (p.title.clone(), snapshot)
            }
            Mutation::RemoveSong { playlist, song } => {
                let p = self.playlists.get_mut(playlist)?;
                let index = p.songs.iter().position(|s| s.id == *song)?;
                let snapshot = Snapshot::Songs {
                    songs: p.songs.clone(),
                    song_count: p.song_count,
                };
                p.songs.remove(index);
                p.song_count = p.song_count.saturating_sub(1);
                (p.title.clone(), snapshot)
            }
            Mutation::Follow { user, following } => {
                let u = self.users.get_mut(user)?;
                if u.is_following == *following {
                    return None;
                }
                let snapshot = Snapshot::Follow {
                    following: u.is_following,
                    followers: u.followers_count,
                };
                u.is_following = *following;
                u.followers_count = bump(u.followers_count, *following);
                (u.username.clone(), snapshot)
            }
        };

        self.in_flight.insert(key);
        Some(Pending {
            id: Uuid::new_v4(),
            mutation,
            label,
            snapshot,
        })
    }

    /// Reconciles with the server's answer, or rolls back on rejection and
    /// returns the message to show the user.
    pub fn settle_mutation(
        &mut self,
        pending: Pending,
        result: Result<Confirmation, String>,
    ) -> Result<(), String> {
        self.in_flight.remove(&pending.mutation.key());

        match result {
            Ok(Confirmation::Count(count)) => {
                match &pending.mutation {
                    Mutation::Like { playlist, .. } => {
                        if let Some(p) = self.playlists.get_mut(playlist) {
                            p.likes_count = count;
                        }
                    }
                    Mutation::Save { playlist, .. } => {
                        if let Some(p) = self.playlists.get_mut(playlist) {
                            p.saves_count = count;
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
            Ok(Confirmation::Done) => Ok(()),
            Err(error) => {
                let message = format!(
                    "Couldn't {} \"{}\": {error}",
                    pending.mutation.verb(),
                    pending.label
                );
                self.rollback(pending);
                Err(message)
            }
        }
    }

    fn rollback(&mut self, pending: Pending) {
        match (pending.mutation, pending.snapshot) {
            (Mutation::Like { playlist, .. }, Snapshot::Like { liked, count }) => {
                if let Some(p) = self.playlists.get_mut(&playlist) {
                    p.is_liked = liked;
                    p.likes_count = count;
                }
            }
            (
                Mutation::Save { playlist, .. },
                Snapshot::Save {
                    saved,
                    count,
                    saved_ids,
                },
            ) => {
                if let Some(p) = self.playlists.get_mut(&playlist) {
                    p.is_saved = saved;
                    p.saves_count = count;
                }
                self.saved = saved_ids;
            }
            (
                Mutation::Reorder { playlist, .. } | Mutation::RemoveSong { playlist, .. },
                Snapshot::Songs { songs, song_count },
            ) => {
                if let Some(p) = self.playlists.get_mut(&playlist) {
                    p.songs = songs;
                    p.song_count = song_count;
                }
            }
            (
                Mutation::Follow { user, .. },
                Snapshot::Follow {
                    following,
                    followers,
                },
            ) => {
                if let Some(u) = self.users.get_mut(&user) {
                    u.is_following = following;
                    u.followers_count = followers;
                }
            }
            _ => unreachable!("snapshot always matches its mutation"),
        }
    }
}

fn bump(count: u32, up: bool) -> u32 {
    if up {
        count.saturating_add(1)
    } else {
        count.saturating_sub(1)
    }
}

fn is_permutation(current: &[&SongId], order: &[SongId]) -> bool {
    let distinct: HashSet<&SongId> = order.iter().collect();
    current.len() == order.len()
        && distinct.len() == order.len()
        && order.iter().all(|id| current.contains(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::playlist;

    fn store_with(p: Playlist) -> AppData {
        let mut data = AppData::default();
        data.upsert_playlist(p);
        data
    }

    fn ids(data: &AppData, id: &str) -> Vec<String> {
        data.playlist(&id.into())
            .unwrap()
            .songs
            .iter()
            .map(|s| s.id.to_string())
            .collect()
    }

    #[test]
    fn like_applies_immediately_and_reconciles_count() {
        let mut data = store_with(playlist("p", &[]));
        let pending = data
            .begin_mutation(Mutation::Like {
                playlist: "p".into(),
                liked: true,
            })
            .unwrap();

        let p = data.playlist(&"p".into()).unwrap();
        assert!(p.is_liked);
        assert_eq!(p.likes_count, 6);

        data.settle_mutation(pending, Ok(Confirmation::Count(9)))
            .unwrap();
        assert_eq!(data.playlist(&"p".into()).unwrap().likes_count, 9);
    }

    #[test]
    fn toggling_like_reverts_state_on_api_rejection() {
        let mut data = store_with(playlist("p", &[]));
        let before = data.playlist(&"p".into()).unwrap().clone();

        let pending = data
            .begin_mutation(Mutation::toggle_like(&before))
            .unwrap();
        let message = data
            .settle_mutation(pending, Err("server returned 500".into()))
            .unwrap_err();

        assert_eq!(data.playlist(&"p".into()).unwrap(), &before);
        assert!(message.contains("like"));
        assert!(message.contains("Playlist p"));
    }

    #[test]
    fn unsave_rejection_restores_saved_collection() {
        let mut p = playlist("p", &[]);
        p.is_saved = true;
        let mut data = AppData::default();
        data.set_saved(vec![playlist("q", &[]), p.clone()]);

        let pending = data.begin_mutation(Mutation::toggle_save(&p)).unwrap();
        assert_eq!(data.saved, vec![PlaylistId::from("q")]);

        data.settle_mutation(pending, Err("offline".into()))
            .unwrap_err();
        assert_eq!(data.saved, vec![PlaylistId::from("q"), PlaylistId::from("p")]);
        assert!(data.playlist(&"p".into()).unwrap().is_saved);
    }

    #[test]
    fn second_toggle_is_refused_while_first_is_pending() {
        let mut data = store_with(playlist("p", &[]));
        let first = data
            .begin_mutation(Mutation::Like {
                playlist: "p".into(),
                liked: true,
            })
            .unwrap();
        assert!(
            data.begin_mutation(Mutation::Like {
                playlist: "p".into(),
                liked: false,
            })
            .is_none()
        );

        data.settle_mutation(first, Ok(Confirmation::Done)).unwrap();
        assert!(
            data.begin_mutation(Mutation::Like {
                playlist: "p".into(),
                liked: false,
            })
            .is_some()
        );
    }

    #[test]
    fn no_op_and_unknown_targets_are_ignored() {
        let mut data = store_with(playlist("p", &[]));
        assert!(
            data.begin_mutation(Mutation::Like {
                playlist: "p".into(),
                liked: false,
            })
            .is_none()
        );
        assert!(
            data.begin_mutation(Mutation::Like {
                playlist: "missing".into(),
                liked: true,
            })
            .is_none()
        );
    }

    #[test]
    fn reorder_rolls_back_to_previous_order() {
        let mut data = store_with(playlist("p", &["a", "b", "c"]));
        let pending = data
            .begin_mutation(Mutation::Reorder {
                playlist: "p".into(),
                order: vec!["c".into(), "a".into(), "b".into()],
            })
            .unwrap();
        assert_eq!(ids(&data, "p"), ["c", "a", "b"]);

        data.settle_mutation(pending, Err("conflict".into()))
            .unwrap_err();
        assert_eq!(ids(&data, "p"), ["a", "b", "c"]);
    }

    #[test]
    fn reorder_must_be_a_permutation() {
        let mut data = store_with(playlist("p", &["a", "b"]));
        assert!(
            data.begin_mutation(Mutation::Reorder {
                playlist: "p".into(),
                order: vec!["a".into(), "x".into()],
            })
            .is_none()
        );
        assert!(
            data.begin_mutation(Mutation::Reorder {
                playlist: "p".into(),
                order: vec!["a".into(), "b".into()],
            })
            .is_none()
        );
        assert!(
            data.begin_mutation(Mutation::Reorder {
                playlist: "p".into(),
                order: vec!["a".into(), "a".into()],
            })
            .is_none()
        );
        assert_eq!(ids(&data, "p"), ["a", "b"]);
    }

    #[test]
    fn remove_song_restores_position_on_failure() {
        let mut data = store_with(playlist("p", &["a", "b", "c"]));
        let pending = data
            .begin_mutation(Mutation::RemoveSong {
                playlist: "p".into(),
                song: "b".into(),
            })
            .unwrap();
        assert_eq!(ids(&data, "p"), ["a", "c"]);
        assert_eq!(data.playlist(&"p".into()).unwrap().song_count, 2);

        data.settle_mutation(pending, Err("nope".into())).unwrap_err();
        assert_eq!(ids(&data, "p"), ["a", "b", "c"]);
        assert_eq!(data.playlist(&"p".into()).unwrap().song_count, 3);
    }

    #[test]
    fn follow_rollback_restores_counts() {
        let mut data = AppData::default();
        let user = User {
            id: "u".into(),
            username: "ana".into(),
            display_name: None,
            avatar_url: None,
            bio: None,
            followers_count: 10,
            following_count: 0,
            is_following: false,
        };
        data.users.insert(user.id.clone(), user.clone());

        let pending = data.begin_mutation(Mutation::toggle_follow(&user)).unwrap();
        assert_eq!(data.users[&user.id].followers_count, 11);

        data.settle_mutation(pending, Err("x".into())).unwrap_err();
        assert_eq!(data.users[&user.id], user);
    }
}
