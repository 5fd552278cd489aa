pub mod classify;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod git_ops;
pub mod model;
pub mod registry;
pub mod repository;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_support;
