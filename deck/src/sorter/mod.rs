//! Timed sorting board
//!
//! Items start in a shared pool. Selecting one moves it into a category list
//! with a return deadline; it goes back to the pool when recalled or when a
//! tick finds the deadline has passed.

mod board;
mod error;
mod item;
mod ticker;

pub use board::{Board, PendingReturn, TickReport};
pub use error::SorterError;
pub use item::{Category, Item, Location, seed_items};
pub use ticker::Ticker;
