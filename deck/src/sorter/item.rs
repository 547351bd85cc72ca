//! Board items and categories

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two category columns an item can be sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruit,
    Vegetable,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Fruit, Category::Vegetable];

    /// Column heading
    pub fn label(self) -> &'static str {
        match self {
            Self::Fruit => "Fruits",
            Self::Vegetable => "Vegetables",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fruit => write!(f, "Fruit"),
            Self::Vegetable => write!(f, "Vegetable"),
        }
    }
}

/// Where an item currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Pool,
    Category(Category),
}

/// A sortable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Column the item naturally belongs to
    pub kind: Category,
    /// Set only while the item sits in a category list
    pub category: Option<Category>,
    /// Set only while the item sits in a category list
    pub return_deadline: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: Category) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            category: None,
            return_deadline: None,
        }
    }

    /// Time left before automatic return, floored at zero
    ///
    /// Pool items have nothing pending and report zero.
    pub fn remaining_time(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.return_deadline {
            Some(deadline) => (deadline - now).max(TimeDelta::zero()),
            None => TimeDelta::zero(),
        }
    }

    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.return_deadline.is_some_and(|deadline| deadline <= now)
    }

    pub(crate) fn enter(&mut self, category: Category, deadline: DateTime<Utc>) {
        self.category = Some(category);
        self.return_deadline = Some(deadline);
    }

    pub(crate) fn leave(&mut self) {
        self.category = None;
        self.return_deadline = None;
    }
}

/// The fixed starting list, in pool order
pub fn seed_items() -> Vec<Item> {
    [
        ("Apple", Category::Fruit),
        ("Broccoli", Category::Vegetable),
        ("Mushroom", Category::Vegetable),
        ("Banana", Category::Fruit),
        ("Tomato", Category::Vegetable),
        ("Orange", Category::Fruit),
        ("Mango", Category::Fruit),
        ("Pineapple", Category::Fruit),
        ("Cucumber", Category::Vegetable),
        ("Watermelon", Category::Fruit),
        ("Carrot", Category::Vegetable),
    ]
    .into_iter()
    .map(|(name, kind)| Item::new(name.to_lowercase(), name, kind))
    .collect()
}
