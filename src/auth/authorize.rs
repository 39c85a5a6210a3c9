use crate::auth::claims::Claims;
use crate::error::ApiError;
use crate::users::model::Role;

/// True iff the numeric role rank meets the required threshold. Absent or
/// sub-threshold ranks deny; anything at or above the threshold permits.
pub fn is_authorized(role: Option<i32>, required: Role) -> bool {
    match role {
        Some(rank) => rank >= required as i32,
        None => false,
    }
}

/// Fail-closed role gate run by handlers before privileged operations.
pub fn require_role(claims: &Claims, required: Role) -> Result<(), ApiError> {
    if is_authorized(claims.role, required) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not have the required permissions to access this resource.".to_string(),
        ))
    }
}
