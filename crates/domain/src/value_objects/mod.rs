pub mod exchange_rate;
pub mod percentage;

pub use exchange_rate::ExchangeRate;
pub use percentage::Percentage;
