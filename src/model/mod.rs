pub mod notification;
pub mod page;
pub mod playlist;
pub mod song;
pub mod user;

use std::hash::Hash;

pub use notification::{Notification, NotificationId, NotificationKind};
pub use page::{Page, SearchResults};
pub use playlist::{Gradient, Playlist, PlaylistDraft, PlaylistId};
pub use song::{Platform, Song, SongDraft, SongId};
pub use user::{User, UserId, UserSummary};

/// Anything with a stable server-side identity.
pub trait Identified {
    type Id: Eq + Hash + Clone + std::fmt::Debug;

    fn id(&self) -> Self::Id;
}

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl crate::model::Identified for $name {
            type Id = $name;

            fn id(&self) -> Self::Id {
                self.clone()
            }
        }
    };
}

pub(crate) use string_id;
