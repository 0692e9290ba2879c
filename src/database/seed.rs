//! Credential seeding.
//!
//! Backs the `seed-users NAME:PASSWORD ...` command.

use tracing::{info, warn};

use super::repository::CredentialStore;
use crate::auth::password_digest;
use crate::error::{AppError, AppResult};

/// Parse `NAME:PASSWORD` arguments.
///
/// The password may itself contain `:`; only the first one splits.
pub fn parse_pairs<I, S>(args: I) -> AppResult<Vec<(String, String)>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| {
            let arg = arg.as_ref();
            match arg.split_once(':') {
                Some((name, password)) if !name.is_empty() && !password.is_empty() => {
                    Ok((name.to_string(), password.to_string()))
                }
                _ => Err(AppError::invalid_input(format!(
                    "expected NAME:PASSWORD, got '{arg}'"
                ))),
            }
        })
        .collect()
}

/// Insert the given credentials, skipping subjects that already exist.
///
/// Returns the number of credentials inserted.
pub async fn seed_users(store: &dyn CredentialStore, users: &[(String, String)]) -> AppResult<usize> {
    let mut inserted = 0;

    for (name, password) in users {
        if store.insert_credential(name, &password_digest(password)).await? {
            info!("Seeded user {}", name);
            inserted += 1;
        } else {
            warn!("User {} already exists, skipping", name);
        }
    }

    Ok(inserted)
}
