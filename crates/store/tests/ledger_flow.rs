//! End-to-end ledger flows: opening balances, purchases, reversals, returns
//! and diagnostics over the in-memory store.

mod common;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kasbook_core::accounts::SystemAccount;
use kasbook_core::documents::PaymentStatus;
use kasbook_core::inventory::verify_chain;
use kasbook_shared::error::AppError;
use kasbook_store::repositories::{
    AccountRepository, DocumentRepository, MovementRepository, ProductRepository,
    VoucherRepository,
};
use kasbook_store::workflow::{
    OpeningBalanceLine, PurchaseInput, PurchaseItemInput, SaleInput, SaleItemInput,
    SaleReturnInput, StockAdjustmentInput,
};

use common::{harness, seed_product};

#[tokio::test]
async fn opening_balance_credits_equity_with_the_residual() {
    let h = harness();
    let cash = h
        .posting
        .ensure_system_account(h.ctx.outlet_id, SystemAccount::Cash)
        .await
        .unwrap();
    let payable = h
        .posting
        .ensure_system_account(h.ctx.outlet_id, SystemAccount::AccountsPayable)
        .await
        .unwrap();

    let receipt = h
        .opening
        .post_opening_balances(
            &h.ctx,
            Utc::now(),
            vec![
                OpeningBalanceLine {
                    account_id: cash.id,
                    balance: dec!(1000),
                },
                OpeningBalanceLine {
                    account_id: payable.id,
                    balance: dec!(400),
                },
            ],
        )
        .await
        .unwrap();

    let voucher = h.store.voucher(receipt.voucher_id).await.unwrap().unwrap();
    assert_eq!(voucher.total_debit, dec!(1000));
    assert_eq!(voucher.total_credit, dec!(1000));

    // The 600 residual lands as a credit on opening-balance equity.
    let equity = h
        .store
        .account_by_subtype(
            h.ctx.outlet_id,
            SystemAccount::OpeningBalanceEquity.subtype(),
        )
        .await
        .unwrap()
        .unwrap();
    let equity_line = voucher
        .lines
        .iter()
        .find(|line| line.account_id == equity.id)
        .unwrap();
    assert_eq!(equity_line.credit, dec!(600));
    assert_eq!(equity.current_balance, dec!(600));

    let cash = h.store.account(cash.id).await.unwrap().unwrap();
    assert_eq!(cash.current_balance, dec!(1000));
}

#[tokio::test]
async fn purchase_blends_weighted_average_cost() {
    let h = harness();
    let product = seed_product(&h, "arabica-beans", Decimal::ZERO, Decimal::ZERO).await;

    let first = PurchaseInput {
        supplier_name: "Roastery".to_string(),
        date: Utc::now(),
        amount_paid: dec!(50),
        items: vec![PurchaseItemInput {
            product_id: product,
            quantity: dec!(10),
            unit_price: dec!(5.00),
        }],
    };
    let outcome = h.purchases.record_purchase(&h.ctx, first).await.unwrap();
    assert!(!outcome.is_partial());

    let second = PurchaseInput {
        supplier_name: "Roastery".to_string(),
        date: Utc::now(),
        amount_paid: dec!(70),
        items: vec![PurchaseItemInput {
            product_id: product,
            quantity: dec!(10),
            unit_price: dec!(7.00),
        }],
    };
    h.purchases.record_purchase(&h.ctx, second).await.unwrap();

    // (10 * 5 + 10 * 7) / 20 = 6.00
    let product = h.store.product(product).await.unwrap().unwrap();
    assert_eq!(product.cost_price, dec!(6.00));
    assert_eq!(product.stock, dec!(20));
}

#[tokio::test]
async fn purchase_on_credit_splits_cash_and_payable() {
    let h = harness();
    let product = seed_product(&h, "grinder", Decimal::ZERO, Decimal::ZERO).await;

    let outcome = h
        .purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Machines Inc".to_string(),
                date: Utc::now(),
                amount_paid: dec!(30),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(1),
                    unit_price: dec!(100),
                }],
            },
        )
        .await
        .unwrap();

    let document = &outcome.value().document;
    assert_eq!(document.payment_status, PaymentStatus::Partial);

    let cash = h
        .store
        .account_by_subtype(h.ctx.outlet_id, SystemAccount::Cash.subtype())
        .await
        .unwrap()
        .unwrap();
    let payable = h
        .store
        .account_by_subtype(h.ctx.outlet_id, SystemAccount::AccountsPayable.subtype())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cash.current_balance, dec!(-30));
    assert_eq!(payable.current_balance, dec!(70));
}

#[tokio::test]
async fn reversal_restores_every_account_balance() {
    let h = harness();
    let product = seed_product(&h, "syrup", Decimal::ZERO, Decimal::ZERO).await;

    let outcome = h
        .purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Syrups Co".to_string(),
                date: Utc::now(),
                amount_paid: dec!(500),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(50),
                    unit_price: dec!(10),
                }],
            },
        )
        .await
        .unwrap();
    let voucher_id = outcome.value().voucher.as_ref().unwrap().voucher_id;

    h.reversal
        .reverse(voucher_id, "duplicate entry", h.ctx.user_id)
        .await
        .unwrap();

    for account in h
        .store
        .accounts_for_outlet(h.ctx.outlet_id)
        .await
        .unwrap()
    {
        assert_eq!(
            account.current_balance,
            Decimal::ZERO,
            "account {} should net to zero after reversal",
            account.code
        );
    }
}

#[tokio::test]
async fn reversal_requires_a_reason() {
    let h = harness();
    let product = seed_product(&h, "cups", Decimal::ZERO, Decimal::ZERO).await;
    let outcome = h
        .purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Paper Co".to_string(),
                date: Utc::now(),
                amount_paid: dec!(20),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(100),
                    unit_price: dec!(0.20),
                }],
            },
        )
        .await
        .unwrap();
    let voucher_id = outcome.value().voucher.as_ref().unwrap().voucher_id;

    let err = h
        .reversal
        .reverse(voucher_id, "  ", h.ctx.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "REASON_REQUIRED");
}

#[tokio::test]
async fn sale_posts_revenue_cogs_and_stock_out() {
    let h = harness();
    let product = seed_product(&h, "latte-beans", Decimal::ZERO, Decimal::ZERO).await;
    h.purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Roastery".to_string(),
                date: Utc::now(),
                amount_paid: dec!(60),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(10),
                    unit_price: dec!(6),
                }],
            },
        )
        .await
        .unwrap();

    let outcome = h
        .sales
        .record_sale(
            &h.ctx,
            SaleInput {
                date: Utc::now(),
                items: vec![SaleItemInput {
                    product_id: product,
                    quantity: dec!(4),
                    unit_price: dec!(15),
                }],
                discount: dec!(5),
                tax: dec!(6),
                amount_paid: dec!(61),
            },
        )
        .await
        .unwrap();
    assert!(!outcome.is_partial());
    assert!(outcome.value().revenue_voucher.is_some());
    assert!(outcome.value().cogs_voucher.is_some());

    let product = h.store.product(product).await.unwrap().unwrap();
    assert_eq!(product.stock, dec!(6));

    let cogs = h
        .store
        .account_by_subtype(h.ctx.outlet_id, SystemAccount::CostOfGoodsSold.subtype())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cogs.current_balance, dec!(24)); // 4 units at cost 6

    let history = h.store.movements_for_product(product.id).await.unwrap();
    verify_chain(&history).unwrap();
}

#[tokio::test]
async fn return_cap_rejects_excess_without_mutating_the_sale() {
    let h = harness();
    let product = seed_product(&h, "mug", Decimal::ZERO, Decimal::ZERO).await;
    h.purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Ceramics".to_string(),
                date: Utc::now(),
                amount_paid: dec!(40),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(10),
                    unit_price: dec!(4),
                }],
            },
        )
        .await
        .unwrap();
    let sale = h
        .sales
        .record_sale(
            &h.ctx,
            SaleInput {
                date: Utc::now(),
                items: vec![SaleItemInput {
                    product_id: product,
                    quantity: dec!(5),
                    unit_price: dec!(20),
                }],
                discount: Decimal::ZERO,
                tax: Decimal::ZERO,
                amount_paid: dec!(100),
            },
        )
        .await
        .unwrap()
        .into_value()
        .sale;

    // First return is within the cap.
    h.sales
        .record_return(
            &h.ctx,
            SaleReturnInput {
                sale_id: sale.id,
                amount: dec!(60),
                reason: "chipped".to_string(),
                items: vec![],
            },
        )
        .await
        .unwrap();

    // 60 already returned; only 40 remains returnable.
    let err = h
        .sales
        .record_return(
            &h.ctx,
            SaleReturnInput {
                sale_id: sale.id,
                amount: dec!(50),
                reason: "changed mind".to_string(),
                items: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let sale = h.store.sale(sale.id).await.unwrap().unwrap();
    assert_eq!(sale.total_returned_amount, dec!(60));
}

#[tokio::test]
async fn full_return_clears_the_tax_liability() {
    let h = harness();
    let product = seed_product(&h, "tea", Decimal::ZERO, Decimal::ZERO).await;
    h.purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Leaves Ltd".to_string(),
                date: Utc::now(),
                amount_paid: dec!(50),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(10),
                    unit_price: dec!(5),
                }],
            },
        )
        .await
        .unwrap();

    // Subtotal 60 plus 6 tax; the full 66 comes back.
    let sale = h
        .sales
        .record_sale(
            &h.ctx,
            SaleInput {
                date: Utc::now(),
                items: vec![SaleItemInput {
                    product_id: product,
                    quantity: dec!(4),
                    unit_price: dec!(15),
                }],
                discount: Decimal::ZERO,
                tax: dec!(6),
                amount_paid: dec!(66),
            },
        )
        .await
        .unwrap()
        .into_value()
        .sale;
    h.sales
        .record_return(
            &h.ctx,
            SaleReturnInput {
                sale_id: sale.id,
                amount: dec!(66),
                reason: "wrong blend".to_string(),
                items: vec![],
            },
        )
        .await
        .unwrap();

    // The refund takes the tax share out of the liability, not out of
    // revenue alone.
    let tax = h
        .store
        .account_by_subtype(h.ctx.outlet_id, SystemAccount::TaxPayable.subtype())
        .await
        .unwrap()
        .unwrap();
    let revenue = h
        .store
        .account_by_subtype(h.ctx.outlet_id, SystemAccount::SalesRevenue.subtype())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tax.current_balance, Decimal::ZERO);
    assert_eq!(revenue.current_balance, Decimal::ZERO);
}

#[tokio::test]
async fn adjustment_requires_reason_and_chains_balances() {
    let h = harness();
    let product = seed_product(&h, "straws", Decimal::ZERO, dec!(0.10)).await;

    let err = h
        .adjustments
        .adjust_stock(
            &h.ctx,
            StockAdjustmentInput {
                product_id: product,
                quantity: dec!(-3),
                reason: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    h.adjustments
        .adjust_stock(
            &h.ctx,
            StockAdjustmentInput {
                product_id: product,
                quantity: dec!(100),
                reason: "initial count".to_string(),
            },
        )
        .await
        .unwrap();
    h.adjustments
        .adjust_stock(
            &h.ctx,
            StockAdjustmentInput {
                product_id: product,
                quantity: dec!(-3),
                reason: "damaged in storage".to_string(),
            },
        )
        .await
        .unwrap();

    let history = h.store.movements_for_product(product).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].balance_after, dec!(97));
    verify_chain(&history).unwrap();
}

#[tokio::test]
async fn sale_with_unknown_product_is_a_partial_outcome() {
    let h = harness();
    let missing = kasbook_shared::types::ProductId::new();

    let outcome = h
        .sales
        .record_sale(
            &h.ctx,
            SaleInput {
                date: Utc::now(),
                items: vec![SaleItemInput {
                    product_id: missing,
                    quantity: dec!(1),
                    unit_price: dec!(10),
                }],
                discount: Decimal::ZERO,
                tax: Decimal::ZERO,
                amount_paid: dec!(10),
            },
        )
        .await
        .unwrap();

    // The sale document is committed; the COGS/stock step failed.
    assert!(outcome.is_partial());
    assert_eq!(outcome.http_status(), 207);
    let sale = h
        .store
        .sale(outcome.value().sale.id)
        .await
        .unwrap();
    assert!(sale.is_some());
}

#[tokio::test]
async fn diagnostics_balance_after_full_flow_and_rebuild_heals_drift() {
    let h = harness();
    let product = seed_product(&h, "beans", Decimal::ZERO, Decimal::ZERO).await;
    h.purchases
        .record_purchase(
            &h.ctx,
            PurchaseInput {
                supplier_name: "Roastery".to_string(),
                date: Utc::now(),
                amount_paid: dec!(100),
                items: vec![PurchaseItemInput {
                    product_id: product,
                    quantity: dec!(20),
                    unit_price: dec!(5),
                }],
            },
        )
        .await
        .unwrap();
    h.sales
        .record_sale(
            &h.ctx,
            SaleInput {
                date: Utc::now(),
                items: vec![SaleItemInput {
                    product_id: product,
                    quantity: dec!(8),
                    unit_price: dec!(12),
                }],
                discount: Decimal::ZERO,
                tax: Decimal::ZERO,
                amount_paid: dec!(96),
            },
        )
        .await
        .unwrap();

    let report = h.diagnostics.diagnose(h.ctx.outlet_id).await.unwrap();
    assert!(report.is_balanced, "equation off by {}", report.equation.difference);
    assert_eq!(report.orphaned_entry_count, 0);

    // Corrupt a cached balance, then diagnose and rebuild.
    let cash = h
        .store
        .account_by_subtype(h.ctx.outlet_id, SystemAccount::Cash.subtype())
        .await
        .unwrap()
        .unwrap();
    h.store
        .set_current_balance(cash.id, dec!(999999))
        .await
        .unwrap();

    let report = h.diagnostics.diagnose(h.ctx.outlet_id).await.unwrap();
    assert!(report.findings.iter().any(|f| f.code == "BALANCE_DRIFT"));

    let changed = h.diagnostics.rebuild_balances(h.ctx.outlet_id).await.unwrap();
    assert_eq!(changed, 1);

    let report = h.diagnostics.diagnose(h.ctx.outlet_id).await.unwrap();
    assert!(report.findings.iter().all(|f| f.code != "BALANCE_DRIFT"));
}

#[tokio::test]
async fn voucher_numbers_increment_within_month_and_type() {
    let h = harness();
    let product = seed_product(&h, "filters", Decimal::ZERO, Decimal::ZERO).await;

    for _ in 0..3 {
        h.purchases
            .record_purchase(
                &h.ctx,
                PurchaseInput {
                    supplier_name: "Paper Co".to_string(),
                    date: Utc::now(),
                    amount_paid: dec!(10),
                    items: vec![PurchaseItemInput {
                        product_id: product,
                        quantity: dec!(10),
                        unit_price: dec!(1),
                    }],
                },
            )
            .await
            .unwrap();
    }

    let prefix = format!("PUR-{}-", Utc::now().format("%Y%m"));
    let mut numbers = h
        .store
        .voucher_numbers_with_prefix(h.ctx.outlet_id, &prefix)
        .await
        .unwrap();
    numbers.sort();
    let suffixes: Vec<_> = numbers
        .iter()
        .map(|n| n.rsplit('-').next().unwrap())
        .collect();
    assert_eq!(suffixes, vec!["00001", "00002", "00003"]);
}
