//! Bid-form validation
//!
//! Mirrors the page's bid form: a name field and a numeric amount field
//! carrying a minimum-value constraint. Rules are checked per field on
//! submit; failures surface as at most one inline message adjacent to the
//! offending field and suppress the submission. Corrected input clears the
//! message live, without a reload. Clearing is all live input does:
//! new errors only appear on submit.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::money;

/// A field failing a validation rule
///
/// Surfaced inline next to the field; blocks submission; user-recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Which field failed ("bidderName" / "bidAmount")
    pub field: &'static str,
    pub message: String,
}

/// A validated, submittable bid
#[derive(Debug, Clone, PartialEq)]
pub struct BidSubmission {
    pub bidder_name: String,
    pub amount: f64,
    pub placed_at: DateTime<Utc>,
}

/// Client-side state of the bid form
#[derive(Debug, Clone)]
pub struct BidForm {
    /// Minimum-value constraint on the amount field; a valid bid is
    /// strictly greater
    min_bid: f64,
    bidder_name: String,
    amount_input: String,
    name_error: Option<String>,
    amount_error: Option<String>,
}

impl BidForm {
    pub fn new(min_bid: f64) -> Self {
        Self {
            min_bid,
            bidder_name: String::new(),
            amount_input: String::new(),
            name_error: None,
            amount_error: None,
        }
    }

    pub fn min_bid(&self) -> f64 {
        self.min_bid
    }

    /// Update the name field (live input)
    ///
    /// Clears the inline error as soon as the value is non-blank.
    pub fn set_bidder_name(&mut self, value: impl Into<String>) {
        self.bidder_name = value.into();
        if !self.bidder_name.trim().is_empty() {
            self.name_error = None;
        }
    }

    /// Update the amount field (live input, raw text)
    ///
    /// Clears the inline error as soon as the value parses and exceeds the
    /// minimum.
    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.amount_input = value.into();
        if let Some(amount) = money::parse_amount(&self.amount_input) {
            if amount > self.min_bid {
                self.amount_error = None;
            }
        }
    }

    /// Inline message next to the name field, if any
    pub fn name_error(&self) -> Option<&str> {
        self.name_error.as_deref()
    }

    /// Inline message next to the amount field, if any
    pub fn amount_error(&self) -> Option<&str> {
        self.amount_error.as_deref()
    }

    /// Attempt to submit the form
    ///
    /// Checks every field, records inline messages for the ones that fail,
    /// and suppresses the submission if any rule failed.
    pub fn submit(&mut self) -> Result<BidSubmission, Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.bidder_name.trim().is_empty() {
            let message = "Please enter your name".to_string();
            self.name_error = Some(message.clone());
            errors.push(ValidationError {
                field: "bidderName",
                message,
            });
        }

        match money::parse_amount(&self.amount_input) {
            None => {
                let message = "Please enter a valid number".to_string();
                self.amount_error = Some(message.clone());
                errors.push(ValidationError {
                    field: "bidAmount",
                    message,
                });
            }
            Some(amount) if amount <= self.min_bid => {
                let message = format!(
                    "Bid must be higher than {}",
                    money::format_currency(self.min_bid)
                );
                self.amount_error = Some(message.clone());
                errors.push(ValidationError {
                    field: "bidAmount",
                    message,
                });
            }
            Some(amount) => {
                if errors.is_empty() {
                    return Ok(BidSubmission {
                        bidder_name: self.bidder_name.trim().to_string(),
                        amount,
                        placed_at: Utc::now(),
                    });
                }
            }
        }

        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_form_submits() {
        let mut form = BidForm::new(100.0);
        form.set_bidder_name("Ada");
        form.set_amount("150.50");

        let submission = form.submit().expect("expected a valid submission");
        assert_eq!(submission.bidder_name, "Ada");
        assert_eq!(submission.amount, 150.50);
        assert!(form.name_error().is_none());
        assert!(form.amount_error().is_none());
    }

    #[test]
    fn amount_at_or_below_minimum_is_blocked_with_one_inline_error() {
        let mut form = BidForm::new(100.0);
        form.set_bidder_name("Ada");
        form.set_amount("100");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "bidAmount");
        assert_eq!(
            form.amount_error(),
            Some("Bid must be higher than $100,00")
        );
        assert!(form.name_error().is_none());
    }

    #[test]
    fn correcting_the_amount_clears_the_error_without_resubmit() {
        let mut form = BidForm::new(100.0);
        form.set_bidder_name("Ada");
        form.set_amount("50");
        assert!(form.submit().is_err());
        assert!(form.amount_error().is_some());

        // Live input above the minimum clears the inline message
        form.set_amount("120");
        assert!(form.amount_error().is_none());

        assert!(form.submit().is_ok());
    }

    #[test]
    fn blank_name_is_blocked_and_clears_on_input() {
        let mut form = BidForm::new(10.0);
        form.set_amount("25");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "bidderName");
        assert_eq!(form.name_error(), Some("Please enter your name"));

        form.set_bidder_name("Grace");
        assert!(form.name_error().is_none());
    }

    #[test]
    fn non_numeric_amount_is_blocked() {
        let mut form = BidForm::new(10.0);
        form.set_bidder_name("Ada");
        form.set_amount("lots of money");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(form.amount_error(), Some("Please enter a valid number"));
    }

    #[test]
    fn both_fields_invalid_yields_one_error_each() {
        let mut form = BidForm::new(10.0);

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(form.name_error().is_some());
        assert!(form.amount_error().is_some());

        // Live clearing is per field
        form.set_bidder_name("Ada");
        assert!(form.name_error().is_none());
        assert!(form.amount_error().is_some());
    }
}
