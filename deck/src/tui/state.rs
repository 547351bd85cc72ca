//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here.

use tracing::debug;

use crate::explorer::{Explorer, FetchTicket};
use crate::sorter::{Board, Category, Item};
use crate::upstream::PageRequest;

/// Which page is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Feature cards
    #[default]
    Home,
    /// Timed sorting board
    Sorter,
    /// Paginated user explorer
    Explorer,
}

impl View {
    pub const ALL: [View; 3] = [View::Home, View::Sorter, View::Explorer];

    /// Get the display name for the header
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Sorter => "Sorter",
            Self::Explorer => "Explorer",
        }
    }
}

/// A card on the home screen
#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub view: View,
}

pub const FEATURES: [Feature; 2] = [
    Feature {
        title: "1. Auto Delete Todo List",
        description: "Sort food into fruits and vegetables. Items return to the list after a few seconds.",
        view: View::Sorter,
    },
    Feature {
        title: "2. Create data from API",
        description: "Fetch, search and page through user data from an external API.",
        view: View::Explorer,
    },
];

/// Keyboard interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Normal,
    /// Typing into the explorer search box
    Search,
    /// Help overlay
    Help,
}

/// Focused column on the sorter page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Pool,
    Category(Category),
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [
        SortColumn::Pool,
        SortColumn::Category(Category::Fruit),
        SortColumn::Category(Category::Vegetable),
    ];

    fn index(self) -> usize {
        match self {
            Self::Pool => 0,
            Self::Category(Category::Fruit) => 1,
            Self::Category(Category::Vegetable) => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Work the runner must perform after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Load an explorer page in the background
    Fetch { ticket: FetchTicket, request: PageRequest },
}

/// Selection state for list views
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    pub selected_index: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Main TUI application state
#[derive(Debug)]
pub struct AppState {
    /// Current view
    pub current_view: View,
    /// Current interaction mode
    pub interaction_mode: InteractionMode,
    /// Should the app quit
    pub should_quit: bool,

    // === Home ===
    pub home_selection: SelectionState,

    // === Sorter ===
    pub board: Board,
    pub sort_focus: SortColumn,
    /// One selection per column, indexed like `SortColumn::ALL`
    pub sort_selection: [SelectionState; 3],

    // === Explorer ===
    pub explorer: Explorer,
    pub explorer_selection: SelectionState,

    // === Pending actions ===
    pub pending_actions: Vec<PendingAction>,
}

impl AppState {
    pub fn new(board: Board, explorer: Explorer) -> Self {
        debug!("AppState::new: called");
        Self {
            current_view: View::Home,
            interaction_mode: InteractionMode::Normal,
            should_quit: false,
            home_selection: SelectionState::default(),
            board,
            sort_focus: SortColumn::Pool,
            sort_selection: Default::default(),
            explorer,
            explorer_selection: SelectionState::default(),
            pending_actions: Vec::new(),
        }
    }

    /// Items shown in a sorter column
    pub fn column_items(&self, column: SortColumn) -> &[Item] {
        match column {
            SortColumn::Pool => self.board.pool(),
            SortColumn::Category(category) => self.board.list(category),
        }
    }

    pub fn column_selection(&self, column: SortColumn) -> &SelectionState {
        &self.sort_selection[column.index()]
    }

    pub fn column_selection_mut(&mut self, column: SortColumn) -> &mut SelectionState {
        &mut self.sort_selection[column.index()]
    }

    /// The item under the cursor in the focused column
    pub fn selected_item(&self) -> Option<&Item> {
        let column = self.sort_focus;
        self.column_items(column)
            .get(self.column_selection(column).selected_index)
    }

    /// Keep every sorter cursor inside its column after the board changed
    pub fn clamp_sort_selection(&mut self) {
        for column in SortColumn::ALL {
            let len = self.column_items(column).len();
            self.column_selection_mut(column).clamp(len);
        }
    }

    pub fn clamp_explorer_selection(&mut self) {
        let len = self.explorer.filtered_users().len();
        self.explorer_selection.clamp(len);
    }
}
