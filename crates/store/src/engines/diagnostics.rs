//! The diagnostics engine: audit pass plus the explicit balance rebuild.
//!
//! `diagnose` is strictly read-only. `rebuild_balances` is the one
//! corrective operation, invoked deliberately by an operator after reviewing
//! a report, never as a side effect of diagnosing.

use std::sync::Arc;

use kasbook_core::diagnostics::{DiagnosticReport, diagnose, rebuild_balance};
use kasbook_shared::types::OutletId;

use crate::error::StoreError;
use crate::repositories::{AccountRepository, LedgerRepository};

/// Runs trial-balance diagnostics and rebuilds cached balances.
#[derive(Clone)]
pub struct DiagnosticsEngine {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

impl DiagnosticsEngine {
    /// Creates a diagnostics engine.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { accounts, ledger }
    }

    /// Runs the read-only audit pass for an outlet.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when loading accounts or entries fails.
    pub async fn diagnose(&self, outlet_id: OutletId) -> Result<DiagnosticReport, StoreError> {
        let accounts = self.accounts.accounts_for_outlet(outlet_id).await?;
        let entries = self.ledger.entries_for_outlet(outlet_id).await?;
        Ok(diagnose(outlet_id, &accounts, &entries))
    }

    /// Recomputes every active account's cached balance from the ledger and
    /// writes it back. Returns the number of accounts whose balance changed.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when loading or writing fails.
    pub async fn rebuild_balances(&self, outlet_id: OutletId) -> Result<usize, StoreError> {
        let accounts = self.accounts.accounts_for_outlet(outlet_id).await?;
        let entries = self.ledger.entries_for_outlet(outlet_id).await?;

        let mut changed = 0;
        for account in accounts.iter().filter(|a| a.is_active) {
            let rebuilt = rebuild_balance(account, &entries);
            if rebuilt != account.current_balance {
                self.accounts.set_current_balance(account.id, rebuilt).await?;
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::info!(%outlet_id, changed, "rebuilt cached account balances");
        }
        Ok(changed)
    }
}
