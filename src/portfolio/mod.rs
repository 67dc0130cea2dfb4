mod holdings;
mod snapshot;

pub use holdings::{
    Holding, HoldingAccount, HoldingsStore, HoldingsStoreError, InMemoryHoldingsStore,
    validate_holdings,
};
pub use snapshot::{DividendSummary, resolve_snapshot, summarize_dividends};
