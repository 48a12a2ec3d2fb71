pub mod coingecko;
pub mod coinpaprika;
pub mod fcd;
pub mod frankfurter;

pub use coingecko::CoinGeckoPriceSource;
pub use coinpaprika::CoinPaprikaPriceSource;
pub use fcd::FcdSwaprateSource;
pub use frankfurter::FrankfurterRateSource;
