//! Owner-or-admin authorization for listing mutations

use crate::error::AppError;
use uuid::Uuid;

/// Permit when the actor owns the resource or holds the admin role.
///
/// The role comes straight from access-token claims, so it is lowercased
/// here instead of trusting the stored casing.
pub fn authorize_mutation(
    acting_identity: Uuid,
    acting_role: &str,
    resource_owner_identity: Uuid,
) -> Result<(), AppError> {
    if acting_identity == resource_owner_identity {
        return Ok(());
    }

    if acting_role.trim().to_lowercase() == "admin" {
        return Ok(());
    }

    tracing::debug!(
        actor = %acting_identity,
        owner = %resource_owner_identity,
        role = acting_role,
        "Mutation denied"
    );
    Err(AppError::Forbidden)
}
