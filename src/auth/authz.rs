use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::extractors::CurrentUser;
use crate::auth::repo::Role;
use crate::error::ApiError;

/// Allow-list of roles a route accepts. Attached declaratively per route and
/// evaluated by the single `restrict` check.
#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    allowed: &'static [Role],
}

impl RolePolicy {
    pub const fn allow(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

pub const STAFF: RolePolicy = RolePolicy::allow(&[Role::Admin, Role::LeadGuide]);
pub const REVIEWERS: RolePolicy = RolePolicy::allow(&[Role::User]);
pub const REVIEW_OWNERS: RolePolicy = RolePolicy::allow(&[Role::User, Role::Admin]);

/// Must run after `authenticate`; a missing user here is a wiring bug.
pub async fn restrict(policy: RolePolicy, req: Request, next: Next) -> Result<Response, ApiError> {
    let CurrentUser(user) = req.extensions().get::<CurrentUser>().ok_or_else(|| {
        ApiError::internal(anyhow::anyhow!(
            "restrict applied to a route without the authenticate middleware"
        ))
    })?;
    if !policy.permits(user.role) {
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(req).await)
}

pub async fn restrict_staff(req: Request, next: Next) -> Result<Response, ApiError> {
    restrict(STAFF, req, next).await
}

pub async fn restrict_reviewers(req: Request, next: Next) -> Result<Response, ApiError> {
    restrict(REVIEWERS, req, next).await
}

pub async fn restrict_review_owners(req: Request, next: Next) -> Result<Response, ApiError> {
    restrict(REVIEW_OWNERS, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_policy_admits_admin_and_lead_guide() {
        assert!(STAFF.permits(Role::Admin));
        assert!(STAFF.permits(Role::LeadGuide));
        assert!(!STAFF.permits(Role::Guide));
        assert!(!STAFF.permits(Role::User));
    }

    #[test]
    fn reviewer_policy_is_users_only() {
        assert!(REVIEWERS.permits(Role::User));
        assert!(!REVIEWERS.permits(Role::Admin));
    }

    #[test]
    fn custom_policies_are_exact() {
        let policy = RolePolicy::allow(&[Role::Guide]);
        assert!(policy.permits(Role::Guide));
        assert!(!policy.permits(Role::LeadGuide));
    }
}
