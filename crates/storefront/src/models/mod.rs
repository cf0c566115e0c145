//! Stored document shapes and session types.
//!
//! Field names are camelCase on the wire and in the store. Timestamps are
//! epoch milliseconds.

pub mod click;
pub mod commission;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod withdrawal;

pub use click::AffiliateClick;
pub use commission::Commission;
pub use order::{Order, OrderDraft, OrderItem};
pub use product::{NewProduct, Product};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewProfile, UserProfile};
pub use withdrawal::WithdrawalRequest;
