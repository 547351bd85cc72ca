//! TUI application - event handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::state::{AppState, FEATURES, InteractionMode, PendingAction, SortColumn, View};
use crate::explorer::{FetchStatus, FetchTicket};
use crate::upstream::PageRequest;

/// TUI application
#[derive(Debug)]
pub struct App {
    /// Application state
    state: AppState,
}

impl App {
    /// Create a new application instance
    pub fn new(state: AppState) -> Self {
        debug!("App::new: called");
        Self { state }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        trace!("App::state: called");
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        trace!("App::state_mut: called");
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_key: called");
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            debug!("App::handle_key: Ctrl+C force quit");
            self.state.should_quit = true;
            return true;
        }

        match self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Search => self.handle_search_key(key),
            InteractionMode::Help => {
                debug!("App::handle_key: closing help");
                self.state.interaction_mode = InteractionMode::Normal;
            }
        }

        self.state.should_quit
    }

    /// Handle key in normal mode
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                debug!("App::handle_normal_key: quit requested");
                self.state.should_quit = true;
                return;
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                debug!("App::handle_normal_key: showing help");
                self.state.interaction_mode = InteractionMode::Help;
                return;
            }
            _ => {}
        }

        match self.state.current_view {
            View::Home => self.handle_home_key(key),
            View::Sorter => self.handle_sorter_key(key),
            View::Explorer => self.handle_explorer_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.home_selection.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.state.home_selection.select_next(FEATURES.len()),
            KeyCode::Enter => {
                let feature = FEATURES[self.state.home_selection.selected_index.min(FEATURES.len() - 1)];
                self.open(feature.view);
            }
            KeyCode::Char('1') => self.open(View::Sorter),
            KeyCode::Char('2') => self.open(View::Explorer),
            _ => {}
        }
    }

    fn handle_sorter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.open(View::Home),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                self.state.sort_focus = self.state.sort_focus.next();
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                self.state.sort_focus = self.state.sort_focus.prev();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let column = self.state.sort_focus;
                self.state.column_selection_mut(column).select_prev();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let column = self.state.sort_focus;
                let len = self.state.column_items(column).len();
                self.state.column_selection_mut(column).select_next(len);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected_item(),
            _ => {}
        }
    }

    /// Pool items go to their column; column items come straight back
    fn toggle_selected_item(&mut self) {
        let Some(id) = self.state.selected_item().map(|i| i.id.clone()) else {
            debug!("App::toggle_selected_item: nothing selected");
            return;
        };

        let result = match self.state.sort_focus {
            SortColumn::Pool => self.state.board.select(&id, Utc::now()).map(|_| ()),
            SortColumn::Category(category) => self.state.board.recall(&id, category).map(|_| ()),
        };
        if let Err(e) = result {
            // Stale click: the item already moved (e.g. it expired this frame)
            debug!(error = %e, "App::toggle_selected_item: ignored");
        }
        self.state.clamp_sort_selection();
    }

    fn handle_explorer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.open(View::Home),
            KeyCode::Char('/') => {
                debug!("App::handle_explorer_key: entering search mode");
                self.state.interaction_mode = InteractionMode::Search;
            }
            KeyCode::Right | KeyCode::Char('n') => {
                if let Some((ticket, request)) = self.state.explorer.next_page() {
                    self.queue_fetch(ticket, request);
                }
            }
            KeyCode::Left | KeyCode::Char('p') => {
                if let Some((ticket, request)) = self.state.explorer.prev_page() {
                    self.queue_fetch(ticket, request);
                }
            }
            KeyCode::Char('r') => {
                debug!("App::handle_explorer_key: retry/refresh");
                let (ticket, request) = self.state.explorer.retry();
                self.queue_fetch(ticket, request);
            }
            KeyCode::Up | KeyCode::Char('k') => self.state.explorer_selection.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.state.explorer.filtered_users().len();
                self.state.explorer_selection.select_next(len);
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                debug!("App::handle_search_key: search applied");
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Esc => {
                debug!("App::handle_search_key: search cleared");
                self.state.explorer.set_search("");
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Backspace => self.state.explorer.pop_search_char(),
            KeyCode::Char(c) => self.state.explorer.push_search_char(c),
            _ => {}
        }
        self.state.clamp_explorer_selection();
    }

    /// Switch page, loading the first explorer page on first visit
    fn open(&mut self, view: View) {
        debug!(from = ?self.state.current_view, to = ?view, "App::open: called");
        self.state.current_view = view;
        if view == View::Explorer && *self.state.explorer.status() == FetchStatus::Idle {
            let (ticket, request) = self.state.explorer.begin_fetch(0);
            self.queue_fetch(ticket, request);
        }
    }

    fn queue_fetch(&mut self, ticket: FetchTicket, request: PageRequest) {
        debug!(?ticket, ?request, "App::queue_fetch: called");
        self.state.pending_actions.push(PendingAction::Fetch { ticket, request });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::Explorer;
    use crate::sorter::{Board, Category, Location};
    use crate::upstream::UserPage;
    use chrono::TimeDelta;

    fn app() -> App {
        App::new(AppState::new(Board::seeded(TimeDelta::seconds(5)), Explorer::new(10)))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));

        let mut app = self::app();
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_home_navigation_opens_features() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().current_view, View::Sorter);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state().current_view, View::Home);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().current_view, View::Explorer);
    }

    #[test]
    fn test_opening_explorer_queues_first_page_once() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));

        let actions = std::mem::take(&mut app.state_mut().pending_actions);
        assert_eq!(actions.len(), 1);
        let PendingAction::Fetch { request, .. } = &actions[0];
        assert_eq!(*request, PageRequest::new(10, 0));
        assert!(app.state().explorer.is_loading());

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert!(app.state().pending_actions.is_empty());
    }

    #[test]
    fn test_sorter_select_and_recall() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));

        // Apple is first in the pool
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.state().board.locate("apple"),
            Some(Location::Category(Category::Fruit))
        );

        press(&mut app, KeyCode::Right);
        assert_eq!(app.state().sort_focus, SortColumn::Category(Category::Fruit));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().board.locate("apple"), Some(Location::Pool));
        assert_eq!(app.state().board.pool().last().unwrap().id, "apple");
    }

    #[test]
    fn test_sorter_enter_on_empty_column_is_ignored() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.state().sort_focus, SortColumn::Category(Category::Vegetable));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().board.pool().len(), 11);
    }

    #[test]
    fn test_sorter_cursor_moves_within_column() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.state().board.locate("broccoli"),
            Some(Location::Category(Category::Vegetable))
        );
    }

    #[test]
    fn test_search_mode_edits_term() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state().interaction_mode, InteractionMode::Search);

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.state().explorer.search(), "q");
        assert!(!app.state().should_quit);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().interaction_mode, InteractionMode::Normal);
        assert_eq!(app.state().explorer.search(), "q");

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state().explorer.search(), "");
    }

    #[test]
    fn test_explorer_paging_and_retry() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        let PendingAction::Fetch { ticket, .. } = app.state_mut().pending_actions.remove(0);

        let page = UserPage {
            users: vec![],
            total: 25,
            skip: 0,
            limit: 10,
        };
        app.state_mut().explorer.complete(ticket, Ok(page));
        assert_eq!(app.state().explorer.status(), &FetchStatus::Loaded);

        press(&mut app, KeyCode::Char('p'));
        assert!(app.state().pending_actions.is_empty());

        press(&mut app, KeyCode::Char('n'));
        let PendingAction::Fetch { request, .. } = app.state_mut().pending_actions.remove(0);
        assert_eq!(request.skip, 10);

        // Page 2 is still loading; retry goes back to the page on screen
        press(&mut app, KeyCode::Char('r'));
        let PendingAction::Fetch { request, .. } = app.state_mut().pending_actions.remove(0);
        assert_eq!(request.skip, 0);
    }

    #[test]
    fn test_help_overlay_closes_on_any_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state().interaction_mode, InteractionMode::Help);

        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.state().interaction_mode, InteractionMode::Normal);
        assert!(!app.state().should_quit);
    }
}
