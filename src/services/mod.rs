//! External collaborators: bar sources, instrument filtering and notifiers.

pub mod filter;
pub mod market_data;
pub mod notifier;
pub mod replay;

pub use filter::ExclusionFilter;
pub use market_data::{InMemoryMarketDataProvider, MarketDataError, MarketDataProvider};
pub use notifier::{
    deliver, DeliveryOutcome, LogNotifier, Notifier, NotifierError, RetryPolicy, WebhookNotifier,
};
pub use replay::ReplayMarketDataProvider;
