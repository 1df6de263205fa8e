//! Shared test harness: an in-memory store wired into every engine and
//! workflow.

use std::sync::Arc;

use rust_decimal::Decimal;

use kasbook_core::inventory::Product;
use kasbook_shared::activity::TracingActivityLog;
use kasbook_shared::auth::AuthContext;
use kasbook_shared::config::ClosingConfig;
use kasbook_shared::types::{OutletId, ProductId, UserId};
use kasbook_store::InMemoryStore;
use kasbook_store::engines::{
    ClosingEngine, DiagnosticsEngine, InventoryMovementLedger, LedgerPostingEngine,
    ReversalEngine, VoucherNumberAllocator, WeightedAverageCostEngine,
};
use kasbook_store::repositories::ProductRepository;
use kasbook_store::workflow::{
    AdjustmentWorkflow, ExpenseWorkflow, OpeningBalanceWorkflow, PurchaseWorkflow, SalesWorkflow,
};

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub ctx: AuthContext,
    pub posting: LedgerPostingEngine,
    pub reversal: ReversalEngine,
    pub movements: InventoryMovementLedger,
    pub costing: WeightedAverageCostEngine,
    pub diagnostics: DiagnosticsEngine,
    pub opening: OpeningBalanceWorkflow,
    pub purchases: PurchaseWorkflow,
    pub expenses: ExpenseWorkflow,
    pub sales: SalesWorkflow,
    pub adjustments: AdjustmentWorkflow,
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let ctx = AuthContext {
        user_id: UserId::new(),
        outlet_id: OutletId::new(),
        email: "owner@example.com".to_string(),
    };
    let activity = Arc::new(TracingActivityLog);

    let posting = LedgerPostingEngine::new(store.clone(), store.clone());
    let allocator = VoucherNumberAllocator::new(store.clone());
    let reversal = ReversalEngine::new(store.clone(), posting.clone());
    let movements = InventoryMovementLedger::new(store.clone(), store.clone());
    let costing = WeightedAverageCostEngine::new(store.clone());
    let diagnostics = DiagnosticsEngine::new(store.clone(), store.clone());

    let opening = OpeningBalanceWorkflow::new(store.clone(), posting.clone(), activity.clone());
    let purchases = PurchaseWorkflow::new(
        store.clone(),
        posting.clone(),
        allocator.clone(),
        movements.clone(),
        costing.clone(),
        activity.clone(),
    );
    let expenses = ExpenseWorkflow::new(
        store.clone(),
        posting.clone(),
        allocator.clone(),
        activity.clone(),
    );
    let sales = SalesWorkflow::new(
        store.clone(),
        store.clone(),
        posting.clone(),
        allocator.clone(),
        movements.clone(),
        activity.clone(),
    );
    let adjustments = AdjustmentWorkflow::new(
        store.clone(),
        movements.clone(),
        posting.clone(),
        activity.clone(),
    );

    Harness {
        store,
        ctx,
        posting,
        reversal,
        movements,
        costing,
        diagnostics,
        opening,
        purchases,
        expenses,
        sales,
        adjustments,
    }
}

pub fn closing_engine(h: &Harness, config: ClosingConfig) -> ClosingEngine {
    ClosingEngine::new(
        h.store.clone(),
        h.store.clone(),
        h.store.clone(),
        h.store.clone(),
        config,
    )
}

pub async fn seed_product(h: &Harness, name: &str, stock: Decimal, cost: Decimal) -> ProductId {
    let product = Product {
        id: ProductId::new(),
        name: name.to_string(),
        sku: name.to_uppercase(),
        stock,
        cost_price: cost,
        selling_price: cost * Decimal::TWO,
        outlet_id: h.ctx.outlet_id,
        is_active: true,
    };
    let id = product.id;
    h.store.insert_product(product).await.unwrap();
    id
}
