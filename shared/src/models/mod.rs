//! Data models
//!
//! Document shapes stored by the server and returned to both clients.
//! Field names are camelCase on the wire. All IDs are opaque strings.

pub mod account;
pub mod analytics;
pub mod cart;
pub mod category;
pub mod customer;
pub mod food;
pub mod location;
pub mod message;
pub mod order;
pub mod staff;
pub mod topping;

// Re-exports
pub use account::*;
pub use analytics::*;
pub use cart::*;
pub use category::*;
pub use customer::*;
pub use food::*;
pub use location::*;
pub use message::*;
pub use order::*;
pub use staff::*;
pub use topping::*;
