pub mod health;
pub mod media_ledger;
pub mod price_calculator;
pub mod uploads;
pub mod uploads_delete;
