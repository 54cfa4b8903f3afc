use std::collections::HashSet;

use crate::model::{Identified, Page};

/// Page-numbered list that grows as the user scrolls.
#[derive(Debug, Clone)]
pub struct Pager<T: Identified> {
    pub items: Vec<T>,
    seen: HashSet<T::Id>,
    next_page: u32,
    has_more: bool,
    /// The page currently requested, if any.
    loading: Option<u32>,
}

impl<T: Identified> Default for Pager<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            has_more: true,
            loading: None,
        }
    }
}

impl<T: Identified> Pager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a request in flight and returns the page to ask for, unless one
    /// is already running or the server said there is nothing left.
    pub fn begin_next(&mut self) -> Option<u32> {
        if self.loading.is_some() || !self.has_more {
            return None;
        }
        self.loading = Some(self.next_page);
        Some(self.next_page)
    }

    /// Appends unseen items. Returns how many were actually added.
    ///
    /// A page that was not the one requested (for example a response that
    /// was already in flight when the list was reset) is dropped.
    pub fn append(&mut self, page: Page<T>) -> usize {
        if self.loading != Some(page.page) {
            return 0;
        }
        let before = self.items.len();
        for item in page.items {
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.next_page = page.page + 1;
        self.has_more = page.has_more;
        self.loading = None;
        self.items.len() - before
    }

    /// Gives up on `page` so it can be asked for again. Failures of pages
    /// that are no longer requested change nothing.
    pub fn fail(&mut self, page: u32) {
        if self.loading == Some(page) {
            self.loading = None;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn remove(&mut self, id: &T::Id) {
        if self.seen.remove(id) {
            self.items.retain(|item| item.id() != *id);
        }
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.seen.contains(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// True until the first page has come back.
    pub fn is_pristine(&self) -> bool {
        self.next_page == 1
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaylistId;

    fn page(ids: &[&str], page: u32, has_more: bool) -> Page<PlaylistId> {
        Page::new(ids.iter().map(|id| PlaylistId::from(*id)).collect(), page, has_more)
    }

    #[test]
    fn pagination_appends_without_duplicating_items() {
        let mut pager = Pager::new();
        assert_eq!(pager.begin_next(), Some(1));
        assert_eq!(pager.append(page(&["a", "b", "c"], 1, true)), 3);

        // A new item was inserted server-side, shifting "c" onto page 2.
        assert_eq!(pager.begin_next(), Some(2));
        assert_eq!(pager.append(page(&["c", "d", "a"], 2, true)), 1);

        let ids: Vec<_> = pager.items.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn only_one_request_in_flight() {
        let mut pager: Pager<PlaylistId> = Pager::new();
        assert_eq!(pager.begin_next(), Some(1));
        assert_eq!(pager.begin_next(), None);

        pager.fail(1);
        assert_eq!(pager.begin_next(), Some(1));
    }

    #[test]
    fn responses_from_before_a_reset_are_dropped() {
        let mut pager = Pager::new();
        pager.begin_next();
        pager.append(page(&["a"], 1, true));
        assert_eq!(pager.begin_next(), Some(2));

        // Refresh while page 2 is still on its way.
        pager.reset();
        assert_eq!(pager.begin_next(), Some(1));
        assert_eq!(pager.append(page(&["b"], 2, true)), 0);
        pager.fail(2);
        assert!(pager.is_loading());

        assert_eq!(pager.append(page(&["a", "c"], 1, true)), 2);
        assert_eq!(pager.begin_next(), Some(2));
        let ids: Vec<_> = pager.items.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn stops_when_server_has_no_more() {
        let mut pager = Pager::new();
        pager.begin_next();
        pager.append(page(&["a"], 1, false));
        assert!(!pager.has_more());
        assert_eq!(pager.begin_next(), None);

        pager.reset();
        assert!(pager.is_empty());
        assert_eq!(pager.begin_next(), Some(1));
    }

    #[test]
    fn removed_items_can_come_back() {
        let mut pager = Pager::new();
        pager.begin_next();
        pager.append(page(&["a", "b"], 1, true));
        pager.remove(&PlaylistId::from("a"));
        assert!(!pager.contains(&PlaylistId::from("a")));

        pager.begin_next();
        assert_eq!(pager.append(page(&["a"], 2, false)), 1);
        assert_eq!(pager.len(), 2);
    }
}
