//! Database module exports.

#[cfg(test)]
pub mod memory;
mod models;
mod mongo;
mod repository;
pub mod seed;

pub use models::*;
pub use mongo::Database;
pub use repository::{CredentialRepository, CredentialStore, RecipeRepository, RecipeStore};
