//! Pool / category partition with timed returns
//!
//! The board owns every item and keeps them partitioned between the pool and
//! the two category lists. Items leave the pool on `assign`, and come back
//! either on `recall` or once their deadline passes and `tick` runs.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use super::{Category, Item, Location, SorterError, seed_items};

/// An item still waiting in a category list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReturn {
    pub id: String,
    pub category: Category,
    pub remaining: TimeDelta,
}

/// Outcome of a single expiry pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Ids moved back to the pool, in the order they were appended
    pub returned: Vec<String>,
    /// Items still in a category list
    pub pending: Vec<PendingReturn>,
}

impl TickReport {
    /// True when the pass moved anything
    pub fn changed(&self) -> bool {
        !self.returned.is_empty()
    }
}

/// The sorting board
#[derive(Debug, Clone)]
pub struct Board {
    pool: Vec<Item>,
    fruit: Vec<Item>,
    vegetable: Vec<Item>,
    window: TimeDelta,
}

impl Board {
    /// Create a board with every item in the pool
    ///
    /// A negative window is treated as zero.
    pub fn new(items: Vec<Item>, window: TimeDelta) -> Self {
        debug!(count = items.len(), ?window, "Board::new: called");
        let pool = items
            .into_iter()
            .map(|mut item| {
                item.leave();
                item
            })
            .collect();
        Self {
            pool,
            fruit: Vec::new(),
            vegetable: Vec::new(),
            window: window.max(TimeDelta::zero()),
        }
    }

    /// Create a board holding the fixed seed list
    pub fn seeded(window: TimeDelta) -> Self {
        Self::new(seed_items(), window)
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn pool(&self) -> &[Item] {
        &self.pool
    }

    pub fn list(&self, category: Category) -> &[Item] {
        match category {
            Category::Fruit => &self.fruit,
            Category::Vegetable => &self.vegetable,
        }
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<Item> {
        match category {
            Category::Fruit => &mut self.fruit,
            Category::Vegetable => &mut self.vegetable,
        }
    }

    /// Total number of items across all containers
    pub fn len(&self) -> usize {
        self.pool.len() + self.fruit.len() + self.vegetable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find which container holds `id`
    pub fn locate(&self, id: &str) -> Option<Location> {
        if self.pool.iter().any(|i| i.id == id) {
            return Some(Location::Pool);
        }
        Category::ALL
            .into_iter()
            .find(|c| self.list(*c).iter().any(|i| i.id == id))
            .map(Location::Category)
    }

    /// Look up an item wherever it is
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.pool
            .iter()
            .chain(self.fruit.iter())
            .chain(self.vegetable.iter())
            .find(|i| i.id == id)
    }

    /// Move an item from the pool into `category`, stamping its deadline
    pub fn assign(&mut self, id: &str, category: Category, now: DateTime<Utc>) -> Result<&Item, SorterError> {
        debug!(%id, %category, "Board::assign: called");
        let Some(pos) = self.pool.iter().position(|i| i.id == id) else {
            debug!(%id, "Board::assign: item not in pool");
            return Err(SorterError::InvalidTransition {
                id: id.to_string(),
                expected: Location::Pool,
            });
        };

        let Some(deadline) = now.checked_add_signed(self.window) else {
            warn!(%id, window = ?self.window, "Return deadline overflows, item stays in pool");
            return Err(SorterError::DeadlineOutOfRange { id: id.to_string() });
        };

        let mut item = self.pool.remove(pos);
        item.enter(category, deadline);
        let list = self.list_mut(category);
        list.push(item);
        Ok(&list[list.len() - 1])
    }

    /// Assign an item to the column of its own kind
    pub fn select(&mut self, id: &str, now: DateTime<Utc>) -> Result<&Item, SorterError> {
        debug!(%id, "Board::select: called");
        let kind = self
            .pool
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.kind)
            .ok_or_else(|| SorterError::InvalidTransition {
                id: id.to_string(),
                expected: Location::Pool,
            })?;
        self.assign(id, kind, now)
    }

    /// Move an item out of `category` back to the end of the pool
    pub fn recall(&mut self, id: &str, category: Category) -> Result<&Item, SorterError> {
        debug!(%id, %category, "Board::recall: called");
        let list = self.list_mut(category);
        let Some(pos) = list.iter().position(|i| i.id == id) else {
            debug!(%id, %category, "Board::recall: item not in category");
            return Err(SorterError::InvalidTransition {
                id: id.to_string(),
                expected: Location::Category(category),
            });
        };

        let mut item = list.remove(pos);
        item.leave();
        self.pool.push(item);
        Ok(&self.pool[self.pool.len() - 1])
    }

    /// Return every expired item to the pool
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();

        for category in Category::ALL {
            let (expired, kept): (Vec<Item>, Vec<Item>) =
                std::mem::take(self.list_mut(category)).into_iter().partition(|i| i.is_expired(now));

            report.pending.extend(kept.iter().map(|i| PendingReturn {
                id: i.id.clone(),
                category,
                remaining: i.remaining_time(now),
            }));
            *self.list_mut(category) = kept;

            for mut item in expired {
                debug!(id = %item.id, %category, "Board::tick: item expired");
                item.leave();
                report.returned.push(item.id.clone());
                self.pool.push(item);
            }
        }

        report
    }

    /// Time left for `id`, zero if it is in the pool or unknown
    pub fn remaining_time(&self, id: &str, now: DateTime<Utc>) -> TimeDelta {
        self.get(id).map(|i| i.remaining_time(now)).unwrap_or_else(TimeDelta::zero)
    }
}
