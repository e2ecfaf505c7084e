//! Helper to build a UserContext from the graph store

use crate::types::UserContext;
use graph_store::{GraphStore, Result, StoreError};

/// Build a UserContext for `user_name`.
///
/// Fails with `UserNotFound` when the user does not exist. A user with no
/// likes yields a context with no genres, not an error.
pub fn build_user_context(store: &dyn GraphStore, user_name: &str) -> Result<UserContext> {
    let record = store
        .get_user(user_name)?
        .ok_or_else(|| StoreError::UserNotFound {
            name: user_name.to_string(),
        })?;

    Ok(UserContext::new(record.name).with_genres(record.genres))
}
