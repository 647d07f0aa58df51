//! Domain types for the collectibles auction

pub mod bid;
pub mod bid_form;
pub mod event;
pub mod money;

pub use bid::Bid;
pub use bid_form::{BidForm, BidSubmission, ValidationError};
pub use event::{FeedMessage, FeedRoute, PriceUpdateEvent};
