pub mod exchange_rate_api;
pub mod fallback;
pub mod util;

pub use exchange_rate_api::ExchangeRateApiProvider;
pub use fallback::{FallbackRateProvider, StaticRateProvider};
