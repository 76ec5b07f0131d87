//! Payment confirmation and the mock payment gateway.
//!
//! The seat hold manager never talks to a payment processor. Checkout asks a
//! [`PaymentGateway`] to charge the hold's total and hands the resulting
//! [`PaymentConfirmation`] to
//! [`SeatHoldManager::finalize`](crate::manager::SeatHoldManager::finalize)
//! as a plain value.

use crate::types::{Hold, HoldId, Money};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of the external payment step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentConfirmation {
    /// The gateway captured `amount`
    Approved {
        /// Gateway transaction reference
        transaction_id: String,
        /// Amount captured, in paise
        amount: Money,
    },
    /// The gateway rejected the charge
    Declined {
        /// Decline reason shown to the customer
        reason: String,
    },
}

impl PaymentConfirmation {
    /// An approved charge
    #[must_use]
    pub fn approved(transaction_id: impl Into<String>, amount: Money) -> Self {
        Self::Approved {
            transaction_id: transaction_id.into(),
            amount,
        }
    }

    /// A declined charge
    #[must_use]
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined {
            reason: reason.into(),
        }
    }

    /// Gateway reference of an approved charge
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Approved { transaction_id, .. } => Some(transaction_id),
            Self::Declined { .. } => None,
        }
    }

    /// Check the confirmation against the amount owed.
    ///
    /// Returns the transaction reference when the charge was approved for
    /// exactly `expected`, otherwise the reason the payment does not count.
    pub(crate) fn settle(&self, expected: Money) -> Result<&str, String> {
        match self {
            Self::Approved {
                transaction_id,
                amount,
            } if *amount == expected => Ok(transaction_id),
            Self::Approved { amount, .. } => Err(format!(
                "amount mismatch: charged {amount}, expected {expected}"
            )),
            Self::Declined { reason } => Err(reason.clone()),
        }
    }
}

/// How the customer pays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Debit or credit card
    Card {
        /// Last four digits
        last_four: String,
    },
    /// UPI virtual payment address
    Upi {
        /// e.g. `name@bank`
        vpa: String,
    },
    /// Net banking
    NetBanking {
        /// Bank code
        bank: String,
    },
}

/// Payment gateway trait
///
/// Abstraction over payment processors. Implementations report declines as
/// [`PaymentConfirmation::Declined`]; they do not fail.
pub trait PaymentGateway: Send + Sync {
    /// Charge the hold's total.
    fn charge(
        &self,
        hold_id: HoldId,
        amount: Money,
        method: PaymentMethod,
    ) -> BoxFuture<'static, PaymentConfirmation>;
}

/// Charge a hold through `gateway` for its full total.
pub async fn charge_hold(
    gateway: &dyn PaymentGateway,
    hold: &Hold,
    method: PaymentMethod,
) -> PaymentConfirmation {
    gateway.charge(hold.id, hold.total, method).await
}

/// Mock payment gateway for development and tests.
///
/// Approves every charge unless built with [`declining`](Self::declining).
#[derive(Clone, Debug, Default)]
pub struct MockPaymentGateway {
    decline_reason: Option<String>,
}

impl MockPaymentGateway {
    /// Creates a gateway that approves everything
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decline_reason: None,
        }
    }

    /// Creates a gateway that declines everything with `reason`
    #[must_use]
    pub fn declining(reason: impl Into<String>) -> Self {
        Self {
            decline_reason: Some(reason.into()),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new())
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn charge(
        &self,
        hold_id: HoldId,
        amount: Money,
        method: PaymentMethod,
    ) -> BoxFuture<'static, PaymentConfirmation> {
        let decline_reason = self.decline_reason.clone();
        async move {
            if let Some(reason) = decline_reason {
                tracing::info!(%hold_id, %amount, reason = %reason, "Mock payment declined");
                return PaymentConfirmation::declined(reason);
            }

            let transaction_id = format!("mock_txn_{}", uuid::Uuid::new_v4());
            tracing::info!(
                %hold_id,
                %amount,
                ?method,
                transaction_id = %transaction_id,
                "Mock payment processed successfully"
            );
            PaymentConfirmation::approved(transaction_id, amount)
        }
        .boxed()
    }
}
