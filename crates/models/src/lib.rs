pub mod errors;
pub mod db;
pub mod validation;
pub mod geometry;
pub mod service_type;
pub mod provider;
pub mod zone;
pub mod service;

#[cfg(test)]
mod tests;
