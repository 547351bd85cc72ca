//! demodeck - a small demo deck with two features
//!
//! - A timed sorter: items moved out of a shared pool into a category list
//!   return to the bottom of the pool once their window runs out.
//! - A user explorer backed by a pagination proxy that relays
//!   `limit`/`skip` requests to an upstream users API.
//!
//! # Modules
//!
//! - [`sorter`] - Board state, expiry sweep and the expiry ticker
//! - [`upstream`] - `UserSource` trait and the HTTP implementation
//! - [`server`] - The `/api/data` proxy endpoint
//! - [`explorer`] - Pagination and search state for the explorer page
//! - [`tui`] - Terminal front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod explorer;
pub mod server;
pub mod sorter;
pub mod tui;
pub mod upstream;

// Re-export commonly used types
pub use config::Config;
pub use explorer::{Explorer, FetchStatus, FetchTicket};
pub use server::ProxyServer;
pub use sorter::{Board, Category, Item, Location, SorterError, TickReport, Ticker};
pub use upstream::{HttpUserSource, PageRequest, UpstreamError, User, UserPage, UserSource, create_source};
