pub mod config;
pub mod dashboard;
pub mod filament;
pub mod marketplace;
pub mod order;
pub mod print;
pub mod printer;
pub mod product;
pub mod production;
pub mod quote;
pub mod report;
pub mod user;

mod lookup;
