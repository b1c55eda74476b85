pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod figure;
pub mod models;
pub mod services;

#[cfg(test)]
mod test;
