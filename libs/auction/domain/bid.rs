//! Bids placed on auction items

use chrono::{DateTime, Utc};

use super::bid_form::BidSubmission;

/// A bid recorded against an item
#[derive(Debug, Clone, PartialEq)]
pub struct Bid {
    pub id: String,
    pub item_id: String,
    pub bidder_name: String,
    pub amount: f64,
    pub placed_at: DateTime<Utc>,
}

impl Bid {
    pub fn new(
        id: impl Into<String>,
        item_id: impl Into<String>,
        bidder_name: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            id: id.into(),
            item_id: item_id.into(),
            bidder_name: bidder_name.into(),
            amount,
            placed_at: Utc::now(),
        }
    }

    /// Build a bid from a validated form submission
    pub fn from_submission(
        id: impl Into<String>,
        item_id: impl Into<String>,
        submission: BidSubmission,
    ) -> Self {
        Self {
            id: id.into(),
            item_id: item_id.into(),
            bidder_name: submission.bidder_name,
            amount: submission.amount,
            placed_at: submission.placed_at,
        }
    }

    /// Relative age for display ("just now", "5 minutes ago", ...)
    pub fn time_ago(&self) -> String {
        let elapsed = Utc::now().signed_duration_since(self.placed_at);
        let minutes = elapsed.num_minutes();

        if minutes < 1 {
            return "just now".to_string();
        }
        if minutes < 60 {
            return format!("{} minutes ago", minutes);
        }

        let hours = minutes / 60;
        if hours < 24 {
            return format!("{} hours ago", hours);
        }

        format!("{} days ago", hours / 24)
    }
}
