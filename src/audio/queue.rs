use super::enums::RepeatMode;
use std::collections::HashSet;

use crate::model::{PlaylistId, Song, SongId};
use rand::{rng, seq::SliceRandom};

const HISTORY_LIMIT: usize = 200;

pub struct QueueManager {
    pub queue: Vec<Song>,
    pub original_queue: Option<Vec<Song>>,
    pub shuffled_index_map: Vec<Option<usize>>,
    pub current_track_index: usize,
    /// Songs added with [`queue_track`](Self::queue_track) rather than by the loaded list.
    queued: HashSet<SongId>,

    pub repeat_mode: RepeatMode,
    pub is_shuffled: bool,

    pub history: Vec<Song>,
    pub history_index: usize,

    pub playback_context: PlaybackContext,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlaybackContext {
    Playlist { id: PlaylistId, title: String },
    List,
    Single,
    #[default]
    Unknown,
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueManager {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            original_queue: None,
            shuffled_index_map: Vec::new(),
            current_track_index: 0,
            queued: HashSet::new(),
            repeat_mode: RepeatMode::None,
            is_shuffled: false,
            history: Vec::new(),
            history_index: 0,
            playback_context: PlaybackContext::Unknown,
        }
    }

    /// Replaces the queue. Shuffle stays on if it was on.
    pub fn load(
        &mut self,
        context: PlaybackContext,
        songs: Vec<Song>,
        start_index: usize,
    ) -> Option<Song> {
        if songs.is_empty() || start_index >= songs.len() {
            return None;
        }

        self.playback_context = context;
        self.original_queue = None;
        self.shuffled_index_map.clear();
        self.queued.clear();
        self.history.clear();
        self.history_index = 0;

        match self.playback_context {
            PlaybackContext::Single => {
                let mut songs = songs;
                self.queue = vec![songs.swap_remove(start_index)];
                self.current_track_index = 0;
            }
            _ => {
                self.queue = songs;
                self.current_track_index = start_index;
            }
        }

        if self.is_shuffled {
            self.is_shuffled = false;
            self.toggle_shuffle();
        }

        let song = self.queue.get(self.current_track_index).cloned();
        if let Some(s) = &song {
            self.add_to_history(s.clone());
        }
        song
    }

    pub fn current(&self) -> Option<&Song> {
        self.queue.get(self.current_track_index)
    }

    pub fn get_next_track(&mut self) -> Option<Song> {
        if self.queue.is_empty() {
            return None;
        }

        if let RepeatMode::Single = self.repeat_mode
            && let Some(song) = self.queue.get(self.current_track_index)
        {
            return Some(song.clone());
        }

        let next_track_index = self.current_track_index + 1;

        if next_track_index >= self.queue.len() {
            if let RepeatMode::All = self.repeat_mode {
                self.current_track_index = 0;
            } else {
                return None;
            }
        } else {
            self.current_track_index = next_track_index;
        }

        let song = self.queue.get(self.current_track_index).cloned();
        if let Some(s) = &song {
            self.add_to_history(s.clone());
        }
        song
    }

    /// Walks back through what was actually played, not the queue order.
    pub fn get_previous_track(&mut self) -> Option<Song> {
        if self.history_index >= 2 {
            self.history_index -= 2;
            let song = self.history.get(self.history_index).cloned();
            self.history_index += 1;

            if let Some(s) = song {
                if let Some(index) = self.queue.iter().position(|q| q.id == s.id) {
                    self.current_track_index = index;
                } else {
                    self.queue.clear();
                    self.queued.clear();
                    self.queue.push(s.clone());
                    if self.is_shuffled {
                        self.shuffled_index_map.clear();
                        self.shuffled_index_map.push(None);
                    }
                    self.current_track_index = 0;
                    self.playback_context = PlaybackContext::Unknown;
                }

                return Some(s);
            }
        }
        None
    }

    /// Inserts `song` right after the current one.
    pub fn queue_track(&mut self, song: Song) {
        let at = if self.queue.is_empty() {
            0
        } else {
            self.current_track_index + 1
        };
        if self.is_shuffled {
            self.shuffled_index_map.insert(at, None);
            if let Some(original) = self.original_queue.as_mut() {
                original.push(song.clone());
            }
        }
        self.queued.insert(song.id.clone());
        self.queue.insert(at, song);
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Song> {
        if index >= self.queue.len() || index == self.current_track_index {
            return None;
        }
        let song = self.queue.remove(index);
        if self.is_shuffled && index < self.shuffled_index_map.len() {
            let mapped = self.shuffled_index_map.remove(index);
            if let Some(original) = self.original_queue.as_mut() {
                let at = mapped
                    .filter(|&at| original.get(at).is_some_and(|s| s.id == song.id))
                    .or_else(|| original.iter().rposition(|s| s.id == song.id));
                if let Some(at) = at {
                    original.remove(at);
                    for slot in self.shuffled_index_map.iter_mut().flatten() {
                        if *slot > at {
                            *slot -= 1;
                        }
                    }
                }
            }
        }
        if !self.queue.iter().any(|s| s.id == song.id) {
            self.queued.remove(&song.id);
        }
        if index < self.current_track_index {
            self.current_track_index -= 1;
        }
        Some(song)
    }

    pub fn toggle_repeat_mode(&mut self) {
        self.repeat_mode = match self.repeat_mode {
            RepeatMode::None => match self.playback_context {
                PlaybackContext::Playlist { .. } | PlaybackContext::List => RepeatMode::All,
                _ => RepeatMode::Single,
            },
            RepeatMode::All => RepeatMode::Single,
            RepeatMode::Single => RepeatMode::None,
        };
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffled = !self.is_shuffled;
        if self.is_shuffled {
            self.original_queue = Some(self.queue.clone());
            let mut indices: Vec<Option<usize>> = (0..self.queue.len()).map(Some).collect();

            if !self.queue.is_empty() && self.current_track_index < self.queue.len() {
                let current_track = self.queue.remove(self.current_track_index);
                let current_index = indices.remove(self.current_track_index);

                let mut combined: Vec<(Song, Option<usize>)> =
                    self.queue.drain(..).zip(indices.drain(..)).collect();
                combined.shuffle(&mut rng());

                // The playing song moves to the front; everything after it is the new order.
                self.queue.push(current_track);
                indices.push(current_index);
                for (s, i) in combined {
                    self.queue.push(s);
                    indices.push(i);
                }
                self.current_track_index = 0;
            } else {
                let mut combined: Vec<(Song, Option<usize>)> =
                    self.queue.drain(..).zip(indices.drain(..)).collect();
                combined.shuffle(&mut rng());

                for (s, i) in combined {
                    self.queue.push(s);
                    indices.push(i);
                }
                self.current_track_index = 0;
            }
            self.shuffled_index_map = indices;
        } else if let Some(original_queue) = self.original_queue.take() {
            let current_id = self.current().map(|s| s.id.clone());
            let original_index = self
                .shuffled_index_map
                .get(self.current_track_index)
                .and_then(|i| *i);

            self.queue = original_queue;
            self.shuffled_index_map.clear();

            self.current_track_index = original_index
                .or_else(|| {
                    current_id.and_then(|id| self.queue.iter().position(|s| s.id == id))
                })
                .unwrap_or(0);
        }
    }

    fn add_to_history(&mut self, song: Song) {
        self.history.truncate(self.history_index);
        self.history.push(song);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history_index = self.history.len();
    }

    pub fn play_track_at_index(&mut self, index: usize) -> Option<Song> {
        if index >= self.queue.len() {
            return None;
        }
        self.current_track_index = index;

        let song = self.queue.get(self.current_track_index).cloned();
        if let Some(s) = &song {
            self.add_to_history(s.clone());
        }
        song
    }

    /// Keeps the queue in step with edits made to the playlist it came from.
    pub fn sync_playlist(&mut self, id: &PlaylistId, songs: &[Song]) {
        let PlaybackContext::Playlist { id: ctx_id, .. } = &self.playback_context else {
            return;
        };
        if ctx_id != id || self.is_shuffled {
            return;
        }
        let Some(current) = self.current().cloned() else {
            return;
        };
        let in_playlist = |id: &SongId| songs.iter().any(|s| s.id == *id);

        // Queued songs still waiting to play ride along right after the current one.
        let upcoming: Vec<Song> = self.queue[self.current_track_index + 1..]
            .iter()
            .filter(|s| self.queued.contains(&s.id) && !in_playlist(&s.id))
            .cloned()
            .collect();

        let mut queue = songs.to_vec();
        let index = match queue.iter().position(|s| s.id == current.id) {
            Some(index) => index,
            None => {
                // The current song left the playlist; keep it playing where it was.
                let at = self.queue[..self.current_track_index]
                    .iter()
                    .rev()
                    .find_map(|prev| queue.iter().position(|s| s.id == prev.id))
                    .map_or(0, |i| i + 1);
                queue.insert(at, current);
                at
            }
        };
        queue.splice(index + 1..index + 1, upcoming);

        self.queued.retain(|id| queue.iter().any(|s| s.id == *id));
        self.queue = queue;
        self.current_track_index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::song;

    fn songs(ids: &[&str]) -> Vec<Song> {
        ids.iter().map(|id| song(id)).collect()
    }

    fn playlist_ctx() -> PlaybackContext {
        PlaybackContext::Playlist {
            id: "p".into(),
            title: "P".into(),
        }
    }

    fn queue_ids(q: &QueueManager) -> Vec<String> {
        q.queue.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn load_starts_at_requested_index_and_keeps_earlier_songs() {
        let mut q = QueueManager::new();
        let first = q.load(playlist_ctx(), songs(&["a", "b", "c"]), 1).unwrap();
        assert_eq!(first.id.as_str(), "b");
        assert_eq!(q.queue.len(), 3);
        assert_eq!(q.get_next_track().unwrap().id.as_str(), "c");
        assert!(q.get_next_track().is_none());
    }

    #[test]
    fn load_rejects_out_of_range() {
        let mut q = QueueManager::new();
        assert!(q.load(PlaybackContext::List, songs(&["a"]), 1).is_none());
        assert!(q.load(PlaybackContext::List, vec![], 0).is_none());
    }

    #[test]
    fn repeat_all_wraps_and_single_repeats() {
        let mut q = QueueManager::new();
        q.load(playlist_ctx(), songs(&["a", "b"]), 1);
        q.toggle_repeat_mode();
        assert_eq!(q.repeat_mode, RepeatMode::All);
        assert_eq!(q.get_next_track().unwrap().id.as_str(), "a");

        q.toggle_repeat_mode();
        assert_eq!(q.repeat_mode, RepeatMode::Single);
        assert_eq!(q.get_next_track().unwrap().id.as_str(), "a");

        q.toggle_repeat_mode();
        assert_eq!(q.repeat_mode, RepeatMode::None);
    }

    #[test]
    fn previous_follows_history() {
        let mut q = QueueManager::new();
        q.load(PlaybackContext::List, songs(&["a", "b", "c"]), 0);
        q.get_next_track();
        q.play_track_at_index(2);
        assert_eq!(q.get_previous_track().unwrap().id.as_str(), "b");
        assert_eq!(q.get_previous_track().unwrap().id.as_str(), "a");
        assert!(q.get_previous_track().is_none());
    }

    #[test]
    fn shuffle_keeps_current_and_restores_order() {
        let mut q = QueueManager::new();
        q.load(
            PlaybackContext::List,
            songs(&["a", "b", "c", "d", "e", "f"]),
            2,
        );
        q.toggle_shuffle();
        assert!(q.is_shuffled);
        assert_eq!(q.current().unwrap().id.as_str(), "c");
        assert_eq!(q.current_track_index, 0);
        let mut sorted = queue_ids(&q);
        sorted.sort();
        assert_eq!(sorted, ["a", "b", "c", "d", "e", "f"]);

        q.get_next_track();
        let playing = q.current().unwrap().id.clone();
        q.toggle_shuffle();
        assert_eq!(queue_ids(&q), ["a", "b", "c", "d", "e", "f"]);
        assert_eq!(q.current().unwrap().id, playing);
    }

    #[test]
    fn queued_song_plays_next_and_survives_unshuffle() {
        let mut q = QueueManager::new();
        q.load(PlaybackContext::List, songs(&["a", "b"]), 0);
        q.queue_track(song("x"));
        assert_eq!(queue_ids(&q), ["a", "x", "b"]);

        q.toggle_shuffle();
        q.queue_track(song("y"));
        assert_eq!(q.get_next_track().unwrap().id.as_str(), "y");
        q.toggle_shuffle();
        assert!(queue_ids(&q).contains(&"y".to_string()));
        assert_eq!(q.current().unwrap().id.as_str(), "y");
    }

    #[test]
    fn removing_before_current_keeps_position() {
        let mut q = QueueManager::new();
        q.load(PlaybackContext::List, songs(&["a", "b", "c"]), 2);
        assert!(q.remove_at(2).is_none());
        assert_eq!(q.remove_at(0).unwrap().id.as_str(), "a");
        assert_eq!(q.current().unwrap().id.as_str(), "c");
    }

    #[test]
    fn sync_follows_playlist_reorder() {
        let mut q = QueueManager::new();
        q.load(playlist_ctx(), songs(&["a", "b", "c"]), 0);
        q.sync_playlist(&"p".into(), &songs(&["c", "b", "a"]));
        assert_eq!(q.current_track_index, 2);
        assert_eq!(q.get_next_track(), None);

        q.sync_playlist(&"other".into(), &songs(&["b"]));
        assert_eq!(q.queue.len(), 3);
    }

    #[test]
    fn removing_while_shuffled_drops_song_from_restored_order() {
        let mut q = QueueManager::new();
        q.load(PlaybackContext::List, songs(&["a", "b", "c", "d"]), 0);
        q.toggle_shuffle();
        let removed = q.remove_at(1).unwrap();
        let playing = q.current().unwrap().id.clone();

        q.toggle_shuffle();
        assert_eq!(q.queue.len(), 3);
        assert!(!q.queue.iter().any(|s| s.id == removed.id));
        assert_eq!(q.current().unwrap().id, playing);
    }

    #[test]
    fn removing_a_song_queued_while_shuffled() {
        let mut q = QueueManager::new();
        q.load(PlaybackContext::List, songs(&["a", "b", "c"]), 0);
        q.toggle_shuffle();
        q.queue_track(song("x"));
        assert_eq!(q.remove_at(1).unwrap().id.as_str(), "x");

        q.toggle_shuffle();
        assert_eq!(queue_ids(&q), ["a", "b", "c"]);
    }

    #[test]
    fn sync_keeps_queued_songs_after_current() {
        let mut q = QueueManager::new();
        q.load(playlist_ctx(), songs(&["a", "b", "c"]), 0);
        q.queue_track(song("x"));
        assert_eq!(queue_ids(&q), ["a", "x", "b", "c"]);

        q.sync_playlist(&"p".into(), &songs(&["a", "c", "b"]));
        assert_eq!(queue_ids(&q), ["a", "x", "c", "b"]);
        assert_eq!(q.current().unwrap().id.as_str(), "a");
        assert_eq!(q.get_next_track().unwrap().id.as_str(), "x");
    }

    #[test]
    fn sync_keeps_playing_song_removed_from_playlist() {
        let mut q = QueueManager::new();
        q.load(playlist_ctx(), songs(&["a", "b", "c"]), 1);
        q.queue_track(song("x"));

        q.sync_playlist(&"p".into(), &songs(&["c", "a"]));
        assert_eq!(queue_ids(&q), ["c", "a", "b", "x"]);
        assert_eq!(q.current().unwrap().id.as_str(), "b");
        assert_eq!(q.get_next_track().unwrap().id.as_str(), "x");
    }
}
