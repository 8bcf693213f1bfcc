//! Authenticated account identity and the exported session credential.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::AccountId;

/// Immutable snapshot of the account taken at the moment sign-in succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub user_id: AccountId,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// Opaque credential blob that re-establishes an authenticated connection
/// without repeating the login handshake.
///
/// `Debug` is redacted: the credential grants full account access and must
/// never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportedCredential(pub String);

impl fmt::Debug for ExportedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExportedCredential(..)")
    }
}
