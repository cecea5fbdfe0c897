//! Payment statuses and direction.
//!
//! Payments carry their own small status graph: they are created pending
//! approval and only `approved` payments ever count toward paid totals.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::statemachine::{State, StateMachine};

/// Direction of a money flow relative to the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Money received (e.g., customer pays a proforma invoice).
    Inbound,
    /// Money paid out (e.g., settling a supplier purchase order).
    Outbound,
}

impl PaymentDirection {
    /// Returns the storage representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    /// Parses a direction from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval lifecycle of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Recorded, awaiting approval.
    PendingApproval,
    /// Approved; counts toward paid totals and may be allocated.
    Approved,
    /// Rejected by the approver.
    Rejected,
    /// Cancelled before or after approval.
    Cancelled,
}

impl PaymentStatus {
    /// Parses a status from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl State for PaymentStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status graph for payments.
pub static PAYMENT_MACHINE: StateMachine<PaymentStatus> = StateMachine {
    edges: &[
        (
            PaymentStatus::PendingApproval,
            &[
                PaymentStatus::Approved,
                PaymentStatus::Rejected,
                PaymentStatus::Cancelled,
            ],
        ),
        (PaymentStatus::Approved, &[PaymentStatus::Cancelled]),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(
            PaymentDirection::parse("inbound"),
            Some(PaymentDirection::Inbound)
        );
        assert_eq!(
            PaymentDirection::parse("outbound"),
            Some(PaymentDirection::Outbound)
        );
        assert_eq!(PaymentDirection::parse("sideways"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            PaymentStatus::PendingApproval,
            PaymentStatus::Approved,
            PaymentStatus::Rejected,
            PaymentStatus::Cancelled,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_pending_can_be_decided() {
        assert!(PAYMENT_MACHINE.can_transition(
            PaymentStatus::PendingApproval,
            PaymentStatus::Approved
        ));
        assert!(PAYMENT_MACHINE.can_transition(
            PaymentStatus::PendingApproval,
            PaymentStatus::Rejected
        ));
    }

    #[test]
    fn test_approved_can_only_be_cancelled() {
        assert!(PAYMENT_MACHINE.can_transition(PaymentStatus::Approved, PaymentStatus::Cancelled));
        assert!(!PAYMENT_MACHINE.can_transition(
            PaymentStatus::Approved,
            PaymentStatus::PendingApproval
        ));
    }

    #[test]
    fn test_rejected_and_cancelled_are_terminal() {
        assert!(PAYMENT_MACHINE.is_terminal(PaymentStatus::Rejected));
        assert!(PAYMENT_MACHINE.is_terminal(PaymentStatus::Cancelled));
    }
}
