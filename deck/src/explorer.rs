//! User data explorer state
//!
//! Pure pagination/search bookkeeping for the explorer view. Fetching is done
//! by whoever owns the state: it asks for a `FetchTicket`, runs the request,
//! and reports back with the same ticket. Answers carrying an older ticket are
//! dropped, so a slow response cannot overwrite a newer page.

use tracing::debug;

use crate::upstream::{PageRequest, UpstreamError, User, UserPage};

/// Identifies one in-flight fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Load status of the current page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Explorer state
#[derive(Debug, Clone)]
pub struct Explorer {
    users: Vec<User>,
    total: u64,
    skip: u64,
    limit: u32,
    search: String,
    status: FetchStatus,
    next_ticket: u64,
    in_flight: Option<FetchTicket>,
}

impl Explorer {
    pub fn new(limit: u32) -> Self {
        debug!(limit, "Explorer::new: called");
        Self {
            users: Vec::new(),
            total: 0,
            skip: 0,
            limit: limit.max(1),
            search: String::new(),
            status: FetchStatus::Idle,
            next_ticket: 0,
            in_flight: None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
    }

    /// Users on the loaded page that match the search term
    pub fn filtered_users(&self) -> Vec<&User> {
        if self.search.is_empty() {
            return self.users.iter().collect();
        }
        self.users.iter().filter(|u| u.matches(&self.search)).collect()
    }

    /// 1-based page number of the loaded page
    pub fn current_page(&self) -> u64 {
        self.skip / self.limit as u64 + 1
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit as u64)
    }

    pub fn has_next(&self) -> bool {
        self.skip.saturating_add(u64::from(self.limit)) < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.skip >= self.limit as u64
    }

    /// Start loading the page at `skip`
    pub fn begin_fetch(&mut self, skip: u64) -> (FetchTicket, PageRequest) {
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.status = FetchStatus::Loading;
        debug!(?ticket, skip, "Explorer::begin_fetch: called");
        (ticket, PageRequest::new(u64::from(self.limit), skip))
    }

    /// Request the following page, if there is one
    pub fn next_page(&mut self) -> Option<(FetchTicket, PageRequest)> {
        if !self.has_next() {
            debug!("Explorer::next_page: already on last page");
            return None;
        }
        Some(self.begin_fetch(self.skip + u64::from(self.limit)))
    }

    /// Request the preceding page, if there is one
    pub fn prev_page(&mut self) -> Option<(FetchTicket, PageRequest)> {
        if !self.has_prev() {
            debug!("Explorer::prev_page: already on first page");
            return None;
        }
        Some(self.begin_fetch(self.skip - self.limit as u64))
    }

    /// Re-request the page currently shown (the first page before any load)
    pub fn retry(&mut self) -> (FetchTicket, PageRequest) {
        self.begin_fetch(self.skip)
    }

    /// Apply a fetch result; returns false if the ticket was stale
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<UserPage, UpstreamError>) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(?ticket, in_flight = ?self.in_flight, "Explorer::complete: stale ticket dropped");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                debug!(count = page.users.len(), total = page.total, "Explorer::complete: page loaded");
                self.users = page.users;
                self.total = page.total;
                self.skip = page.skip;
                self.status = FetchStatus::Loaded;
            }
            Err(e) => {
                debug!(error = %e, "Explorer::complete: fetch failed");
                self.status = FetchStatus::Failed(e.user_message().to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::USER_MESSAGE;

    fn page(skip: u64, count: u64, total: u64) -> UserPage {
        UserPage {
            users: (skip..skip + count)
                .map(|i| User {
                    id: i + 1,
                    first_name: format!("First{}", i + 1),
                    last_name: "Smith".to_string(),
                    email: format!("user{}@example.com", i + 1),
                    username: format!("user{}", i + 1),
                    ..Default::default()
                })
                .collect(),
            total,
            skip,
            limit: 10,
        }
    }

    #[test]
    fn test_initial_state() {
        let explorer = Explorer::new(10);
        assert_eq!(explorer.status(), &FetchStatus::Idle);
        assert_eq!(explorer.current_page(), 1);
        assert_eq!(explorer.total_pages(), 0);
        assert!(!explorer.has_next());
        assert!(!explorer.has_prev());
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        assert_eq!(Explorer::new(0).limit(), 1);
    }

    #[test]
    fn test_load_and_paginate() {
        let mut explorer = Explorer::new(10);

        let (ticket, request) = explorer.begin_fetch(0);
        assert_eq!(request, PageRequest::new(10, 0));
        assert!(explorer.is_loading());

        assert!(explorer.complete(ticket, Ok(page(0, 10, 25))));
        assert_eq!(explorer.status(), &FetchStatus::Loaded);
        assert_eq!(explorer.users().len(), 10);
        assert_eq!(explorer.total_pages(), 3);
        assert_eq!(explorer.current_page(), 1);
        assert!(explorer.has_next());
        assert!(!explorer.has_prev());
        assert!(explorer.prev_page().is_none());

        let (ticket, request) = explorer.next_page().unwrap();
        assert_eq!(request.skip, 10);
        explorer.complete(ticket, Ok(page(10, 10, 25)));

        let (ticket, request) = explorer.next_page().unwrap();
        assert_eq!(request.skip, 20);
        explorer.complete(ticket, Ok(page(20, 5, 25)));
        assert_eq!(explorer.current_page(), 3);
        assert!(!explorer.has_next());
        assert!(explorer.next_page().is_none());

        let (_, request) = explorer.prev_page().unwrap();
        assert_eq!(request.skip, 10);
    }

    #[test]
    fn test_failure_keeps_previous_page_and_retry_reloads_current_page() {
        let mut explorer = Explorer::new(10);
        let (ticket, _) = explorer.begin_fetch(0);
        explorer.complete(ticket, Ok(page(0, 10, 30)));

        let (ticket, _) = explorer.next_page().unwrap();
        let err = UpstreamError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        explorer.complete(ticket, Err(err));

        assert_eq!(explorer.status(), &FetchStatus::Failed(USER_MESSAGE.to_string()));
        assert_eq!(explorer.skip(), 0);
        assert_eq!(explorer.users().len(), 10);

        let (_, request) = explorer.retry();
        assert_eq!(request.skip, 0);
        assert_eq!(request.limit, 10);
        assert!(explorer.is_loading());
    }

    #[test]
    fn test_retry_after_failed_first_load_requests_first_page() {
        let mut explorer = Explorer::new(10);
        let (ticket, _) = explorer.begin_fetch(0);
        explorer.complete(ticket, Err(UpstreamError::Timeout(std::time::Duration::from_secs(10))));

        let (_, request) = explorer.retry();
        assert_eq!(request, PageRequest::new(10, 0));
    }

    #[test]
    fn test_retry_on_loaded_page_refreshes_it() {
        let mut explorer = Explorer::new(10);
        let (ticket, _) = explorer.begin_fetch(20);
        explorer.complete(ticket, Ok(page(20, 10, 30)));

        let (_, request) = explorer.retry();
        assert_eq!(request.skip, 20);
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut explorer = Explorer::new(10);
        let (old, _) = explorer.begin_fetch(0);
        let (new, _) = explorer.begin_fetch(10);

        assert!(!explorer.complete(old, Ok(page(0, 10, 30))));
        assert!(explorer.is_loading());

        assert!(explorer.complete(new, Ok(page(10, 10, 30))));
        assert_eq!(explorer.skip(), 10);
        assert!(!explorer.complete(new, Ok(page(20, 10, 30))));
    }

    #[test]
    fn test_search_filters_loaded_page() {
        let mut explorer = Explorer::new(10);
        let (ticket, _) = explorer.begin_fetch(0);
        explorer.complete(ticket, Ok(page(0, 10, 10)));

        explorer.set_search("first1");
        let names: Vec<_> = explorer.filtered_users().iter().map(|u| u.id).collect();
        assert_eq!(names, vec![1, 10]);

        explorer.push_search_char('0');
        assert_eq!(explorer.filtered_users().len(), 1);

        explorer.pop_search_char();
        explorer.pop_search_char();
        explorer.pop_search_char();
        assert_eq!(explorer.search(), "firs");
        assert_eq!(explorer.filtered_users().len(), 10);

        explorer.set_search("USER7@");
        assert_eq!(explorer.filtered_users().len(), 1);

        explorer.set_search("");
        assert_eq!(explorer.filtered_users().len(), 10);
    }
}
