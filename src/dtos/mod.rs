pub mod coerce;
pub mod config;
pub mod filament;
pub mod marketplace;
pub mod order;
pub mod print;
pub mod printer;
pub mod product;
pub mod production;
pub mod user;
