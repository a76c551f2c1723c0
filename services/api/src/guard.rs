//! Ownership guard
//!
//! Every mutable entity carries an owner reference. Handlers fetch the
//! entity first (absent -> 404) and then run this check (present but
//! foreign -> 403); the two outcomes are never conflated.

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Entities that belong to a single user
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Pure predicate: may `actor` mutate this entity?
pub fn can_mutate<E: Owned>(actor: Uuid, entity: &E) -> bool {
    entity.owner_id() == actor
}

/// Fail with `PermissionDenied` unless the actor owns the entity
pub fn ensure_can_mutate<E: Owned>(actor: Uuid, entity: &E, what: &str) -> ApiResult<()> {
    if can_mutate(actor, entity) {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied(format!(
            "You can only modify your own {}",
            what
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    struct Thing {
        owner: Uuid,
    }

    impl Owned for Thing {
        fn owner_id(&self) -> Uuid {
            self.owner
        }
    }

    #[test]
    fn test_owner_may_mutate() {
        let owner = Uuid::new_v4();
        let thing = Thing { owner };
        assert!(can_mutate(owner, &thing));
        assert!(ensure_can_mutate(owner, &thing, "video").is_ok());
    }

    #[test]
    fn test_non_owner_is_denied_with_403() {
        let thing = Thing {
            owner: Uuid::new_v4(),
        };
        let stranger = Uuid::new_v4();
        assert!(!can_mutate(stranger, &thing));

        let err = ensure_can_mutate(stranger, &thing, "video").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
