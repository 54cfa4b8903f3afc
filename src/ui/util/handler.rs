use std::future::Future;

use chrono::Utc;
use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    audio::queue::PlaybackContext,
    event::events::Event,
    http::NotificationApi,
    model::PlaylistId,
    services::social,
    store::Mutation,
    ui::{
        app::App,
        input::InputHandler,
        message::{AppMessage, ViewRoute},
        traits::Action,
        tui::{TerminalEvent, Tui},
    },
    util::external::open_in_browser,
};

pub struct EventHandler;

impl EventHandler {
    pub async fn handle_events(app: &mut App, tui: &mut Tui) -> color_eyre::Result<bool> {
        let mut should_render = false;
        if let Some(evt) = tui.next().await
            && Self::handle_event(app, evt, tui).await?
        {
            should_render = true;
        }

        while let Ok(evt) = app.event_rx.try_recv() {
            Self::handle_action(app, evt).await;
            should_render = true;
        }

        Ok(should_render)
    }

    pub async fn handle_event(
        app: &mut App,
        evt: TerminalEvent,
        tui: &mut Tui,
    ) -> color_eyre::Result<bool> {
        match evt {
            TerminalEvent::Init => app.start().await,
            TerminalEvent::FocusGained => {
                app.has_focus = true;
                tui.clear()?;
            }
            TerminalEvent::FocusLost => app.has_focus = false,
            TerminalEvent::Key(key) => Self::handle_key_event(app, key).await,
            TerminalEvent::Mouse(mouse) => Self::handle_mouse_event(app, mouse).await,
            TerminalEvent::Paste(text) => {
                if let Some(view) = app.router.active_view_mut() {
                    view.handle_paste(&text);
                }
            }
            TerminalEvent::Tick => {
                app.state.ui.expire_toasts(std::time::Instant::now());
                return Ok(app.has_focus);
            }
            _ => {}
        }

        Ok(true)
    }

    /// Runs `job` in the background and feeds its result back into the loop.
    /// A new job under the same key replaces the old one.
    pub fn spawn<F>(app: &mut App, key: &str, job: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let tx = app.ctx.event_tx.clone();
        app.task_manager.spawn(
            key,
            tokio::spawn(async move {
                let _ = tx.send_async(job.await).await;
            }),
        );
    }

    pub async fn handle_action(app: &mut App, evt: Event) {
        app.router.on_event(&evt, &app.state, &app.ctx).await;

        match evt {
            // Session
            Event::Login { email, password } => {
                let api = app.ctx.api.clone();
                Self::spawn(app, "auth", async move {
                    match api.login(&email, &password).await {
                        Ok(user) => Event::SignedIn(user),
                        Err(e) => Event::AuthFailed(e.to_string()),
                    }
                });
            }
            Event::Register {
                username,
                email,
                password,
            } => {
                let api = app.ctx.api.clone();
                Self::spawn(app, "auth", async move {
                    match api.register(&username, &email, &password).await {
                        Ok(user) => Event::SignedIn(user),
                        Err(e) => Event::AuthFailed(e.to_string()),
                    }
                });
            }
            Event::SignedIn(user) => {
                info!(user = user.id.as_str(), "signed_in");
                app.state.ui.success(format!("Welcome, {}", user.name()));
                app.state.data.sign_in(user);
                app.start_poller();
                app.go_home().await;
            }
            Event::SessionRestored(user) => {
                info!(user = user.id.as_str(), "session_restored");
                app.state.data.sign_in(user);
                app.start_poller();
            }
            Event::AuthFailed(message) => {
                warn!(error = message.as_str(), "auth_failed");
                app.state.ui.error(message);
            }
            Event::SessionInvalid(message) => {
                warn!(error = message.as_str(), "session_invalid");
                app.end_session().await;
                app.state.ui.error("Your session has expired. Please sign in again.");
            }
            Event::SessionExpired => {
                warn!("session_expired");
                app.end_session().await;
                app.state.ui.error("Your session has expired. Please sign in again.");
            }
            Event::Logout => {
                let api = app.ctx.api.clone();
                Self::spawn(app, "auth", async move {
                    if let Err(e) = api.logout().await {
                        warn!(error = %e, "logout_request_failed");
                    }
                    Event::SignedOut
                });
            }
            Event::SignedOut => {
                info!("signed_out");
                app.end_session().await;
                app.state.ui.info("Signed out");
            }
            Event::WelcomeDone => app.go_home().await,

            // Feed & discover
            Event::RefreshFeed => {
                app.state.data.feed.reset();
                Self::load_feed_page(app);
            }
            Event::LoadMoreFeed => Self::load_feed_page(app),
            Event::FeedLoaded(page) => {
                let added = app.state.data.append_feed(page);
                debug!(added, "feed_page_appended");
            }
            Event::FeedFailed(page, message) => {
                app.state.data.feed.fail(page);
                Self::report(app, "Couldn't load your feed", &message);
            }
            Event::RefreshDiscover => {
                app.state.data.discover.reset();
                Self::load_discover_page(app);
            }
            Event::LoadMoreDiscover => Self::load_discover_page(app),
            Event::DiscoverLoaded(page) => {
                let added = app.state.data.append_discover(page);
                debug!(added, "discover_page_appended");
            }
            Event::DiscoverFailed(page, message) => {
                app.state.data.discover.fail(page);
                Self::report(app, "Couldn't load discover", &message);
            }

            // Library
            Event::RefreshLibrary => {
                let api = app.ctx.api.clone();
                Self::spawn(app, "library", async move {
                    match tokio::try_join!(api.fetch_my_playlists(), api.fetch_saved_playlists())
                    {
                        Ok((mine, saved)) => Event::LibraryLoaded { mine, saved },
                        Err(e) => Event::FetchError(format!("Couldn't load your library: {e}")),
                    }
                });
            }
            Event::LibraryLoaded { mine, saved } => {
                app.state.data.set_mine(mine);
                app.state.data.set_saved(saved);
            }

            // Playlists
            Event::OpenPlaylist(id) => {
                app.update(AppMessage::NavigateTo(ViewRoute::PlaylistDetail(id)))
                    .await;
            }
            Event::FetchPlaylist(id) => {
                let api = app.ctx.api.clone();
                let key = format!("playlist:{id}");
                Self::spawn(app, &key, async move {
                    match api.fetch_playlist(&id).await {
                        Ok(playlist) => Event::PlaylistFetched(playlist),
                        Err(e) => Event::PlaylistFetchFailed(id, e.to_string()),
                    }
                });
            }
            Event::PlaylistFetched(playlist) => {
                let id = playlist.id.clone();
                info!(playlist_id = %id, songs = playlist.songs.len(), "playlist_fetched");
                app.state.data.store_playlist_detail(playlist, Utc::now());
                Self::sync_queue(app, &id);
            }
            Event::PlaylistFetchFailed(id, message) => {
                warn!(playlist_id = %id, error = message.as_str(), "playlist_fetch_failed");
                app.state.ui.error(format!("Couldn't load the playlist: {message}"));
            }
            Event::CreatePlaylist(draft) => {
                let api = app.ctx.api.clone();
                Self::spawn(app, &write_key("create_playlist"), async move {
                    match api.create_playlist(&draft).await {
                        Ok(playlist) => Event::PlaylistCreated(playlist),
                        Err(e) => Event::FetchError(format!("Couldn't create the playlist: {e}")),
                    }
                });
            }
            Event::PlaylistCreated(playlist) => {
                let id = playlist.id.clone();
                info!(playlist_id = %id, "playlist_created");
                app.state.ui.success(format!("Created \"{}\"", playlist.title));
                app.state.data.add_mine(playlist.clone());
                app.state.data.store_playlist_detail(playlist, Utc::now());
                app.update(AppMessage::NavigateTo(ViewRoute::PlaylistDetail(id)))
                    .await;
            }
            Event::UpdatePlaylist(id, draft) => {
                let api = app.ctx.api.clone();
                Self::spawn(app, &write_key("update_playlist"), async move {
                    match api.update_playlist(&id, &draft).await {
                        Ok(playlist) => Event::PlaylistUpdated(playlist),
                        Err(e) => Event::FetchError(format!("Couldn't save the playlist: {e}")),
                    }
                });
            }
            Event::PlaylistUpdated(playlist) => {
                info!(playlist_id = %playlist.id, "playlist_updated");
                app.state.ui.success("Playlist saved");
                app.state.data.upsert_playlist(playlist);
            }
            Event::DeletePlaylist(id) => {
                let api = app.ctx.api.clone();
                Self::spawn(app, &write_key("delete_playlist"), async move {
                    match api.delete_playlist(&id).await {
                        Ok(()) => Event::PlaylistDeleted(id),
                        Err(e) => Event::FetchError(format!("Couldn't delete the playlist: {e}")),
                    }
                });
            }
            Event::PlaylistDeleted(id) => {
                info!(playlist_id = %id, "playlist_deleted");
                app.state.data.remove_playlist(&id);
                app.router.close_playlist(&id);
                app.state.ui.info("Playlist deleted");
            }
            Event::AddSong(id, draft) => {
                let api = app.ctx.api.clone();
                Self::spawn(app, &write_key("add_song"), async move {
                    match api.add_song(&id, &draft).await {
                        Ok(song) => Event::SongAdded(id, song),
                        Err(e) => Event::FetchError(format!("Couldn't add the song: {e}")),
                    }
                });
            }
            Event::SongAdded(id, song) => {
                info!(playlist_id = %id, song = song.id.as_str(), "song_added");
                app.state.ui.success(format!("Added \"{}\"", song.title));
                if let Some(playlist) = app.state.data.playlist_mut(&id) {
                    playlist.songs.push(song);
                    playlist.song_count = playlist.songs.len() as u32;
                }
                Self::sync_queue(app, &id);
            }
            Event::SharePlaylist(id) => {
                let api = app.ctx.api.clone();
                let key = format!("share:{id}");
                Self::spawn(app, &key, async move {
                    let url = social::share_link(&api, &id).await;
                    Event::ShareLink(id, url)
                });
            }
            Event::ShareLink(id, url) => {
                info!(playlist_id = %id, url = url.as_str(), "share_link");
                app.state.ui.info(format!("Share link: {url}"));
            }

            // Optimistic mutations
            Event::Mutate(mutation) => Self::mutate(app, mutation),
            Event::MutationSettled(pending, result) => {
                let songs_of = match &pending.mutation {
                    Mutation::Reorder { playlist, .. } | Mutation::RemoveSong { playlist, .. } => {
                        Some(playlist.clone())
                    }
                    _ => None,
                };
                if let Err(message) = app.state.data.settle_mutation(pending, result) {
                    error!(error = message.as_str(), "mutation_rolled_back");
                    app.state.ui.error(message);
                }
                if let Some(id) = songs_of {
                    Self::sync_queue(app, &id);
                }
            }

            // Search & users
            Event::Search(query) => {
                let api = app.ctx.api.clone();
                Self::spawn(app, "search", async move {
                    match api.search(&query).await {
                        Ok(results) => Event::SearchResults(query, results),
                        Err(e) => Event::FetchError(format!("Search failed: {e}")),
                    }
                });
            }
            Event::SearchResults(query, results) => {
                debug!(
                    query = query.as_str(),
                    playlists = results.playlists.len(),
                    users = results.users.len(),
                    songs = results.songs.len(),
                    "search_results"
                );
                app.state.data.set_search_results(results);
            }
            Event::OpenUser(id) => {
                app.update(AppMessage::NavigateTo(ViewRoute::Profile(Some(id))))
                    .await;
            }
            Event::FetchUser(id) => {
                let api = app.ctx.api.clone();
                let key = format!("user:{id}");
                Self::spawn(app, &key, async move {
                    match tokio::try_join!(api.fetch_user(&id), api.fetch_user_playlists(&id)) {
                        Ok((user, playlists)) => Event::UserFetched(user, playlists),
                        Err(e) => Event::FetchError(format!("Couldn't load the profile: {e}")),
                    }
                });
            }
            Event::UserFetched(user, playlists) => {
                for playlist in playlists {
                    app.state.data.upsert_playlist(playlist);
                }
                app.state.data.users.insert(user.id.clone(), user);
            }

            // Notifications
            Event::UnreadCount(count) => app.state.data.unread_count = count,
            Event::RefreshNotifications => {
                app.state.data.notifications.reset();
                Self::load_notifications_page(app);
            }
            Event::LoadMoreNotifications => Self::load_notifications_page(app),
            Event::NotificationsLoaded(page) => {
                app.state.data.notifications.append(page);
            }
            Event::NotificationsFailed(page, message) => {
                app.state.data.notifications.fail(page);
                Self::report(app, "Couldn't load notifications", &message);
            }
            Event::MarkRead(id) => {
                if app.state.data.mark_notification_read(&id) {
                    let api = app.ctx.api.clone();
                    let key = format!("read:{id}");
                    Self::spawn(app, &key, async move {
                        match api.mark_read(&id).await {
                            Ok(()) => Self::recount(api.as_ref()).await,
                            Err(e) => Event::MarkReadFailed(id, e.to_string()),
                        }
                    });
                }
            }
            Event::MarkAllRead => {
                let receipt = app.state.data.mark_all_notifications_read();
                let api = app.ctx.api.clone();
                Self::spawn(app, "read_all", async move {
                    match api.mark_all_read().await {
                        Ok(()) => Self::recount(api.as_ref()).await,
                        Err(e) => Event::MarkAllReadFailed(receipt, e.to_string()),
                    }
                });
            }

            Event::MarkReadFailed(id, message) => {
                warn!(notification_id = %id, error = message.as_str(), "mark_read_rejected");
                app.state.data.mark_notification_unread(&id);
                app.state.ui.error(format!("Couldn't mark as read: {message}"));
            }

            Event::MarkAllReadFailed(receipt, message) => {
                warn!(restored = receipt.ids.len(), error = message.as_str(), "mark_all_read_rejected");
                app.state.data.restore_read_receipt(receipt);
                app.state.ui.error(format!("Couldn't mark as read: {message}"));
            }

            // Playback
            Event::PlayPlaylist(id, index) => {
                let Some(playlist) = app.state.data.playlist(&id) else {
                    return;
                };
                if playlist.songs.is_empty() {
                    app.state.ui.info("This playlist has no songs yet");
                    return;
                }
                let context = PlaybackContext::Playlist {
                    id: playlist.id.clone(),
                    title: playlist.title.clone(),
                };
                let songs = playlist.songs.clone();
                app.ctx
                    .audio_system
                    .load_context(context, songs, index)
                    .await;
            }
            Event::PlaySong(song) => app.ctx.audio_system.play_single(song).await,
            Event::QueueSong(song) => {
                app.state.ui.info(format!("Queued \"{}\"", song.title));
                app.ctx.audio_system.queue_track(song);
            }
            Event::PlayQueueIndex(index) => {
                app.ctx.audio_system.play_track_at_index(index).await;
            }
            Event::RemoveFromQueue(index) => {
                app.ctx.audio_system.remove_from_queue(index);
            }
            Event::TrackEnded => app.ctx.audio_system.on_track_ended().await,
            Event::TrackStarted(song) => debug!(song = song.id.as_str(), "track_started"),
            Event::QueueEnded => info!("queue_ended"),
            Event::ExternalPlayback(song) => {
                app.state.ui.info(format!(
                    "\"{}\" plays on {}. Press o to open it.",
                    song.title,
                    song.platform().label()
                ));
            }
            Event::PlaybackFailed(song, message) => {
                app.state
                    .ui
                    .error(format!("Couldn't play \"{}\": {message}", song.title));
            }
            Event::OpenExternal(url) => {
                if let Err(e) = open_in_browser(&url) {
                    app.state.ui.error(format!("Couldn't open the browser: {e}"));
                }
            }

            Event::FetchError(message) => {
                error!(error = message.as_str(), "request_failed");
                app.state.ui.error(message);
            }
        }
    }

    /// The server's unread count once a read receipt went through.
    async fn recount(api: &dyn NotificationApi) -> Event {
        match api.unread_count().await {
            Ok(count) => Event::UnreadCount(count),
            Err(e) => Event::FetchError(format!("Couldn't refresh notifications: {e}")),
        }
    }

    fn report(app: &mut App, context: &str, message: &str) {
        error!(error = message, "{context}");
        app.state.ui.error(format!("{context}: {message}"));
    }

    fn load_feed_page(app: &mut App) {
        let Some(page) = app.state.data.feed.begin_next() else {
            return;
        };
        let api = app.ctx.api.clone();
        let limit = app.ctx.config.feed_page_size;
        debug!(page, "feed_page_requested");
        Self::spawn(app, "feed", async move {
            match api.fetch_feed(page, limit).await {
                Ok(body) => Event::FeedLoaded(body),
                Err(e) => Event::FeedFailed(page, e.to_string()),
            }
        });
    }

    fn load_discover_page(app: &mut App) {
        let Some(page) = app.state.data.discover.begin_next() else {
            return;
        };
        let api = app.ctx.api.clone();
        let limit = app.ctx.config.feed_page_size;
        debug!(page, "discover_page_requested");
        Self::spawn(app, "discover", async move {
            match api.fetch_discover(page, limit).await {
                Ok(body) => Event::DiscoverLoaded(body),
                Err(e) => Event::DiscoverFailed(page, e.to_string()),
            }
        });
    }

    fn load_notifications_page(app: &mut App) {
        let Some(page) = app.state.data.notifications.begin_next() else {
            return;
        };
        let api = app.ctx.api.clone();
        let limit = app.ctx.config.feed_page_size;
        Self::spawn(app, "notifications", async move {
            match api.fetch_notifications(page, limit).await {
                Ok(body) => Event::NotificationsLoaded(body),
                Err(e) => Event::NotificationsFailed(page, e.to_string()),
            }
        });
    }

    /// Applies the change locally and sends it to the server.
    fn mutate(app: &mut App, mutation: Mutation) {
        if app.state.data.has_pending(&mutation) {
            app.state.ui.info("Still saving your last change…");
            return;
        }
        let Some(pending) = app.state.data.begin_mutation(mutation) else {
            return;
        };

        if let Mutation::Reorder { playlist, .. } | Mutation::RemoveSong { playlist, .. } =
            &pending.mutation
        {
            let id = playlist.clone();
            Self::sync_queue(app, &id);
        }

        let api = app.ctx.api.clone();
        let key = format!("mutation:{}", pending.id);
        Self::spawn(app, &key, async move {
            let result = social::commit(api.as_ref(), &pending.mutation)
                .await
                .map_err(|e| e.to_string());
            Event::MutationSettled(pending, result)
        });
    }

    /// Keeps a playing queue in step with the playlist it came from.
    fn sync_queue(app: &mut App, id: &PlaylistId) {
        if let Some(playlist) = app.state.data.playlist(id) {
            app.ctx.audio_system.sync_playlist(id, &playlist.songs);
        }
    }

    async fn handle_key_event(app: &mut App, evt: KeyEvent) {
        if evt.kind != KeyEventKind::Press {
            return;
        }

        if evt.code == KeyCode::Char('c') && evt.modifiers == KeyModifiers::CONTROL {
            app.update(AppMessage::Quit).await;
            return;
        }

        let action = app.router.handle_input(evt, &app.state, &app.ctx).await;
        if let Some(action) = action {
            Self::dispatch_action(app, action).await;
            return;
        }

        if app.router.is_fullscreen() || app.router.captures_text() {
            return;
        }

        if let Some(msg) = InputHandler::handle_key(evt) {
            app.update(msg).await;
        }
    }

    async fn dispatch_action(app: &mut App, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => app.should_quit = true,
            Action::Back => app.update(AppMessage::GoBack).await,
            Action::Navigate(route) => app.update(AppMessage::NavigateTo(route)).await,
            Action::Overlay(route) => app.update(AppMessage::ShowOverlay(route)).await,
            Action::CloseOverlay => app.update(AppMessage::CloseOverlay).await,
        }
    }

    async fn handle_mouse_event(app: &mut App, evt: MouseEvent) {
        if app.router.is_fullscreen() {
            return;
        }
        match (evt.kind, evt.modifiers) {
            (MouseEventKind::ScrollUp, KeyModifiers::SHIFT) => {
                app.ctx.audio_system.seek_forwards().await
            }
            (MouseEventKind::ScrollUp, _) => app.ctx.audio_system.volume_up(),
            (MouseEventKind::ScrollDown, KeyModifiers::SHIFT) => {
                app.ctx.audio_system.seek_backwards().await
            }
            (MouseEventKind::ScrollDown, _) => app.ctx.audio_system.volume_down(),
            _ => {}
        }
    }
}

/// Writes never cancel each other, so each one gets its own task slot.
fn write_key(kind: &str) -> String {
    format!("{kind}:{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        store::{AppState, fixtures::playlist},
        ui::{context::AppContext, router::Router, views::PlaylistDetail},
        util::task::TaskManager,
    };

    async fn app_playing(ids: &[&str]) -> App {
        let (ctx, event_rx) = AppContext::for_tests();
        let mut app = App {
            state: AppState::default(),
            ctx,
            router: Router::new(Box::new(PlaylistDetail::new("p".into()))),
            task_manager: TaskManager::new(),
            event_rx,
            has_focus: true,
            should_quit: false,
        };
        let p = playlist("p", ids);
        let songs = p.songs.clone();
        app.state.data.store_playlist_detail(p, Utc::now());
        let context = PlaybackContext::Playlist {
            id: "p".into(),
            title: "P".into(),
        };
        app.ctx.audio_system.load_context(context, songs, 0).await;
        while app.event_rx.try_recv().is_ok() {}
        app
    }

    fn queue_ids(app: &App) -> Vec<String> {
        app.ctx
            .audio_system
            .queue()
            .iter()
            .map(|s| s.id.to_string())
            .collect()
    }

    #[test]
    fn write_keys_are_unique_per_request() {
        assert_ne!(write_key("add_song"), write_key("add_song"));
        assert!(write_key("delete_playlist").starts_with("delete_playlist:"));
    }

    #[tokio::test]
    async fn reorder_moves_the_queue_and_rolls_back_with_it() {
        let mut app = app_playing(&["a", "b", "c"]).await;
        let order = vec!["c".into(), "b".into(), "a".into()];
        EventHandler::handle_action(
            &mut app,
            Event::Mutate(Mutation::Reorder {
                playlist: "p".into(),
                order,
            }),
        )
        .await;
        assert_eq!(queue_ids(&app), ["c", "b", "a"]);
        assert_eq!(app.ctx.audio_system.current_track_index(), 2);

        let settled = loop {
            let event = tokio::time::timeout(Duration::from_secs(30), app.event_rx.recv_async())
                .await
                .expect("mutation settles")
                .expect("channel open");
            if matches!(event, Event::MutationSettled(..)) {
                break event;
            }
        };
        assert!(matches!(&settled, Event::MutationSettled(_, Err(_))));

        EventHandler::handle_action(&mut app, settled).await;
        assert_eq!(queue_ids(&app), ["a", "b", "c"]);
        assert_eq!(app.ctx.audio_system.current_track_index(), 0);
        assert!(!app.state.ui.toasts.is_empty());
    }

    #[tokio::test]
    async fn rejected_read_receipt_restores_unread() {
        let mut app = app_playing(&["a"]).await;
        app.state.data.unread_count = 0;

        EventHandler::handle_action(
            &mut app,
            Event::MarkAllReadFailed(
                crate::store::ReadReceipt {
                    ids: Vec::new(),
                    unread_count: 3,
                },
                "offline".into(),
            ),
        )
        .await;
        assert_eq!(app.state.data.unread_count, 3);
        assert!(!app.state.ui.toasts.is_empty());
    }
}
