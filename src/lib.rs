pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod job_scheduling;
pub mod maintenance;
pub mod models;
pub mod notifications;

#[cfg(test)]
pub(crate) mod testing;
