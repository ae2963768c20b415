pub mod aggregator;
pub mod position_service;
pub mod quote_service;
