//! Order status lifecycle.
//!
//! The transition table is fixed: every status maps to the set of statuses
//! an order may move to next. Terminal statuses map to the empty set. The
//! status-update page action checks this table before any request is sent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    InKitchen,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::InKitchen,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::InKitchen => "in-kitchen",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step from `self`.
    pub fn next_statuses(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Accepted, Cancelled, Rejected],
            Accepted => &[Preparing, Cancelled, InKitchen],
            InKitchen => &[Ready, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => &[Delivered],
            Delivered | Cancelled | Rejected => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }
}

/// Validate a move from `current` to `next`, returning the new status.
pub fn apply(current: OrderStatus, next: OrderStatus) -> AdminResult<OrderStatus> {
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(AdminError::InvalidTransition {
            from: current,
            to: next,
        })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AdminError;

    /// Accepts the wire form plus the spellings operators tend to type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "rejected" => Ok(OrderStatus::Rejected),
            "in-kitchen" | "inkitchen" => Ok(OrderStatus::InKitchen),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(AdminError::field(
                "status",
                format!("Unknown order status: {other}"),
            )),
        }
    }
}
