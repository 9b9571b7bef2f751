pub mod models;
pub mod reducer;
pub mod schedule;
pub mod timer;
