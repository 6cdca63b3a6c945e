use hackathon_core::DomainError;

use crate::{Identity, Role};

/// Check that an already-authenticated identity holds one of `allowed`.
///
/// An empty `allowed` set admits any authenticated identity. The error never
/// says which roles would have been accepted.
///
/// - No IO
/// - No token handling (the identity is trusted as resolved upstream)
pub fn authorize_roles(identity: &Identity, allowed: &[Role]) -> Result<(), DomainError> {
    if allowed.is_empty() || allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackathon_core::UserId;
    use proptest::prelude::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: UserId::new(1),
            email: "someone@example.com".to_string(),
            role,
            participant: None,
        }
    }

    #[test]
    fn empty_allow_list_admits_everyone() {
        for role in Role::ALL {
            assert!(authorize_roles(&identity(role), &[]).is_ok());
        }
    }

    #[test]
    fn judge_cannot_reach_admin_routes() {
        let err = authorize_roles(&identity(Role::Judge), &[Role::Superadmin, Role::Admin]).unwrap_err();
        assert_eq!(err, DomainError::Forbidden);
        assert!(!err.to_string().contains("admin"));
    }

    proptest! {
        #[test]
        fn admitted_iff_role_in_allowed_set(
            role_idx in 0usize..5,
            mask in 1u8..32,
        ) {
            let role = Role::ALL[role_idx];
            let allowed: Vec<Role> = Role::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, r)| r)
                .collect();
            let result = authorize_roles(&identity(role), &allowed);
            prop_assert_eq!(result.is_ok(), allowed.contains(&role));
        }
    }
}
