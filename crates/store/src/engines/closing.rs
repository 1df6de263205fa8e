//! The closing engine: previews, commits and locks closing periods.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use kasbook_core::accounts::{AccountSubtype, AccountType};
use kasbook_core::closing::{
    Closing, ClosingError, ClosingPreview, ClosingStatus, ClosingType, balance_from_entries,
    cash_basis_totals, cogs_from_entries, cutoff_time_label, discount_from_entries, profit_margin,
    resolve_period, revenue_from_entries, tax_from_entries,
};
use kasbook_shared::config::ClosingConfig;
use kasbook_shared::types::{AccountId, ClosingId, OutletId, UserId};

use crate::repositories::{
    AccountRepository, ClosingRepository, DocumentRepository, LedgerRepository,
};

/// Computes and manages closing periods for an outlet.
#[derive(Clone)]
pub struct ClosingEngine {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn LedgerRepository>,
    closings: Arc<dyn ClosingRepository>,
    documents: Arc<dyn DocumentRepository>,
    config: ClosingConfig,
}

impl ClosingEngine {
    /// Creates a closing engine with the outlet's closing configuration.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn LedgerRepository>,
        closings: Arc<dyn ClosingRepository>,
        documents: Arc<dyn DocumentRepository>,
        config: ClosingConfig,
    ) -> Self {
        Self {
            accounts,
            ledger,
            closings,
            documents,
            config,
        }
    }

    /// Computes the preview for a prospective closing without persisting
    /// anything.
    ///
    /// # Errors
    ///
    /// [`ClosingError::InvalidPeriod`] / [`ClosingError::InvalidCutoffHour`]
    /// from boundary resolution, plus [`ClosingError::Storage`] on
    /// repository failure.
    pub async fn preview(
        &self,
        outlet_id: OutletId,
        closing_type: ClosingType,
        closing_date: NaiveDate,
    ) -> Result<ClosingPreview, ClosingError> {
        let previous = self
            .closings
            .latest_closing_before(outlet_id, closing_type, closing_date)
            .await?;
        let earliest = self.ledger.earliest_entry_date(outlet_id).await?;

        let bounds = resolve_period(
            closing_type,
            closing_date,
            self.config.late_night_cutoff_hour,
            previous.map(|c| c.period_end),
            earliest,
            self.config.include_historical_data_in_first_closing,
        )?;

        let accounts = self.accounts.accounts_for_outlet(outlet_id).await?;
        let ids_where = |pred: &dyn Fn(&kasbook_core::accounts::Account) -> bool| {
            accounts
                .iter()
                .filter(|a| a.is_active && pred(a))
                .map(|a| a.id)
                .collect::<HashSet<AccountId>>()
        };
        let revenue_accounts = ids_where(&|a| a.account_type == AccountType::Revenue);
        let cogs_accounts = ids_where(&|a| a.subtype == Some(AccountSubtype::CostOfGoodsSold));
        let discount_accounts = ids_where(&|a| a.subtype == Some(AccountSubtype::SalesDiscount));
        let tax_accounts = ids_where(&|a| a.subtype == Some(AccountSubtype::TaxPayable));
        let cash_accounts = ids_where(&|a| a.subtype == Some(AccountSubtype::Cash));
        let bank_accounts = ids_where(&|a| a.subtype == Some(AccountSubtype::Bank));

        let period_entries = self
            .ledger
            .entries_in_range(outlet_id, bounds.start, bounds.end)
            .await?;
        let total_revenue = revenue_from_entries(&period_entries, &revenue_accounts);
        let total_cogs = cogs_from_entries(&period_entries, &cogs_accounts);
        // Same source as revenue: a sale whose posting failed contributes to
        // none of the ledger figures.
        let total_discount = discount_from_entries(&period_entries, &discount_accounts);
        let total_tax = tax_from_entries(&period_entries, &tax_accounts);

        // Opening balances are evaluated a millisecond before the period
        // starts; closing balances at the period end. Both are full
        // re-scans, independent of the cached account balances.
        let before_start = self
            .ledger
            .entries_up_to(outlet_id, bounds.start - Duration::milliseconds(1))
            .await?;
        let through_end = self.ledger.entries_up_to(outlet_id, bounds.end).await?;
        let opening_cash = balance_from_entries(&before_start, &cash_accounts);
        let opening_bank = balance_from_entries(&before_start, &bank_accounts);
        let projected_closing_cash = balance_from_entries(&through_end, &cash_accounts);
        let projected_closing_bank = balance_from_entries(&through_end, &bank_accounts);

        let purchases = self
            .documents
            .purchases_in_range(outlet_id, bounds.start, bounds.end)
            .await?;
        let purchase_totals = cash_basis_totals(
            purchases
                .iter()
                .filter(|p| !p.is_reversed)
                .map(|p| (p.grand_total, p.amount_paid, p.payment_status)),
        );
        let expenses = self
            .documents
            .expenses_in_range(outlet_id, bounds.start, bounds.end)
            .await?;
        let expense_totals = cash_basis_totals(
            expenses
                .iter()
                .filter(|e| !e.is_reversed)
                .map(|e| (e.grand_total, e.amount_paid, e.payment_status)),
        );

        let gross_profit = total_revenue - total_cogs;
        let net_profit =
            total_revenue - (total_cogs + purchase_totals.paid + expense_totals.paid);

        Ok(ClosingPreview {
            is_first_closing: bounds.is_first_closing,
            period_start: bounds.start,
            period_end: bounds.end,
            cutoff_time: cutoff_time_label(self.config.late_night_cutoff_hour),
            opening_cash,
            opening_bank,
            projected_closing_cash,
            projected_closing_bank,
            total_revenue,
            total_discount,
            total_tax,
            total_cogs,
            total_purchases: purchase_totals.paid,
            total_expenses: expense_totals.paid,
            gross_profit,
            net_profit,
            gross_profit_margin: profit_margin(gross_profit, total_revenue),
            net_profit_margin: profit_margin(net_profit, total_revenue),
            historical_days_included: bounds.historical_days,
            unpaid_purchases_total: purchase_totals.unpaid,
            data_source: "cash-basis".to_string(),
        })
    }

    /// Commits a closing for the date, freezing its figures.
    ///
    /// # Errors
    ///
    /// [`ClosingError::PeriodAlreadyClosed`] when the date is already
    /// closed, plus everything [`Self::preview`] can return.
    pub async fn close(
        &self,
        outlet_id: OutletId,
        closing_type: ClosingType,
        closing_date: NaiveDate,
        closed_by: UserId,
    ) -> Result<Closing, ClosingError> {
        if self
            .closings
            .closing_for_date(outlet_id, closing_type, closing_date)
            .await?
            .is_some()
        {
            return Err(ClosingError::PeriodAlreadyClosed);
        }

        let preview = self.preview(outlet_id, closing_type, closing_date).await?;
        let closing = Closing {
            id: ClosingId::new(),
            closing_type,
            closing_date,
            period_start: preview.period_start,
            period_end: preview.period_end,
            total_revenue: preview.total_revenue,
            total_cogs: preview.total_cogs,
            total_purchases: preview.total_purchases,
            total_expenses: preview.total_expenses,
            gross_profit: preview.gross_profit,
            net_profit: preview.net_profit,
            opening_cash: preview.opening_cash,
            opening_bank: preview.opening_bank,
            closing_cash: preview.projected_closing_cash,
            closing_bank: preview.projected_closing_bank,
            status: ClosingStatus::Closed,
            closed_by: Some(closed_by),
            closed_at: Some(Utc::now()),
            outlet_id,
        };
        self.closings.insert_closing(closing.clone()).await?;
        tracing::info!(
            %outlet_id,
            ?closing_type,
            %closing_date,
            net_profit = %closing.net_profit,
            "committed closing"
        );
        Ok(closing)
    }

    /// Locks a closed period, making it fully immutable.
    ///
    /// # Errors
    ///
    /// - [`ClosingError::NotFound`] when the closing is missing
    /// - [`ClosingError::InvalidTransition`] unless the closing is `closed`
    pub async fn lock(&self, closing_id: ClosingId) -> Result<Closing, ClosingError> {
        let mut closing = self
            .closings
            .closing(closing_id)
            .await?
            .ok_or(ClosingError::NotFound(closing_id))?;

        if !closing.status.can_transition_to(ClosingStatus::Locked) {
            return Err(ClosingError::InvalidTransition {
                from: closing.status,
                to: ClosingStatus::Locked,
            });
        }
        self.closings
            .set_status(closing_id, ClosingStatus::Locked)
            .await?;
        closing.status = ClosingStatus::Locked;
        Ok(closing)
    }
}
