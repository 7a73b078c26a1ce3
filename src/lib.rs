pub mod config;
pub mod modules;
pub mod telemetry;

pub use modules::auth;

#[cfg(test)]
mod tests;
