pub mod account;
pub mod category;
pub mod loss_summary;
pub mod market_index;
pub mod position;

pub use account::{AccountBalance, Settlement};
pub use category::{Category, CategoryMap};
pub use loss_summary::{LossReport, LossSummary};
pub use market_index::MarketIndex;
pub use position::{EnrichedPosition, Position};
