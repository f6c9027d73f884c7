//! External market data providers.

pub mod coingecko;
pub mod market_data;

pub use coingecko::CoinGeckoProvider;
pub use market_data::{InMemoryMarketData, MarketDataProvider};
