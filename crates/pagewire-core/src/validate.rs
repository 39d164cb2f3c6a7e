//! Required-field validation.
//!
//! Values are trimmed before the emptiness check. Only the first failing
//! field (document order) is reported; callers move focus there and abort.

use crate::error::{PageWireError, Result};

/// Id of the first field whose trimmed value is empty.
pub fn first_empty<I, K, V>(fields: I) -> Option<K>
where
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<str>,
{
    fields
        .into_iter()
        .find(|(_, v)| v.as_ref().trim().is_empty())
        .map(|(k, _)| k)
}

/// `Err(Validation)` naming the first empty field, `Ok(())` when all are set.
pub fn require_all<I, K, V>(fields: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    match first_empty(fields) {
        Some(field) => Err(PageWireError::Validation { field: field.into() }),
        None => Ok(()),
    }
}
