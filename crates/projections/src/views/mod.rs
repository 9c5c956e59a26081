//! Read model views.

mod active_orders;
mod order_history;

pub use active_orders::{ActiveOrderSummary, ActiveOrdersView};
pub use order_history::{HistoryEntry, OrderHistoryView};
