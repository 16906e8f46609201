//! Credit ledger.
//!
//! Every balance change made on behalf of a generation goes through here.
//! The check and the decrement happen in a single store call, so two
//! requests racing for the last credit cannot both win.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use style_preview_core::TenantId;

use crate::db::RepositoryError;
use crate::store::{Deduction, TenantStore};

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("salon not found")]
    TenantNotFound,

    #[error("insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: i32, available: i32 },

    #[error("credit amount must be positive, got {0}")]
    InvalidAmount(i32),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Integer credit balances per salon.
#[derive(Clone)]
pub struct CreditLedger {
    tenants: Arc<dyn TenantStore>,
}

impl CreditLedger {
    #[must_use]
    pub fn new(tenants: Arc<dyn TenantStore>) -> Self {
        Self { tenants }
    }

    /// Take `amount` credits from a salon and return the new balance.
    ///
    /// # Errors
    ///
    /// - `InsufficientCredits` with the unchanged balance if it does not cover `amount`
    /// - `TenantNotFound` for unknown salons
    /// - `InvalidAmount` if `amount` is not positive
    #[instrument(skip(self))]
    pub async fn deduct(&self, tenant_id: TenantId, amount: i32) -> Result<i32, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        match self.tenants.deduct_credits(tenant_id, amount).await {
            Ok(Deduction::Applied { remaining }) => {
                debug!(remaining, "Credits deducted");
                Ok(remaining)
            }
            Ok(Deduction::Insufficient { available }) => {
                debug!(available, "Insufficient credits");
                Err(LedgerError::InsufficientCredits {
                    required: amount,
                    available,
                })
            }
            Err(RepositoryError::NotFound) => Err(LedgerError::TenantNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Give `amount` credits back to a salon and return the new balance.
    ///
    /// # Errors
    ///
    /// Returns `TenantNotFound` for unknown salons and `InvalidAmount` if
    /// `amount` is not positive.
    #[instrument(skip(self))]
    pub async fn refund(&self, tenant_id: TenantId, amount: i32) -> Result<i32, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        match self.tenants.add_credits(tenant_id, amount).await {
            Ok(balance) => {
                warn!(balance, "Credits refunded");
                Ok(balance)
            }
            Err(RepositoryError::NotFound) => Err(LedgerError::TenantNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
