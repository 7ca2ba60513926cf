pub mod audit;
pub mod driver;
pub mod event;
pub mod league;
pub mod points;
pub mod result;
pub mod season;
pub mod standings;
