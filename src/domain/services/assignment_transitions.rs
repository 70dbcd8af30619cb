use crate::domain::entities::AssignmentStatus;
use crate::domain::errors::{DomainError, DomainResult};

/// Validates an assignment status change.
///
/// Only the promoter moves `waitlisted -> assigned`; cancellation may end either
/// active state. `cancelled` is terminal.
pub fn validate_transition(from: AssignmentStatus, to: AssignmentStatus) -> DomainResult<()> {
    use AssignmentStatus::*;

    match (from, to) {
        (Waitlisted, Assigned) => Ok(()),
        (Assigned, Cancelled) => Ok(()),
        (Waitlisted, Cancelled) => Ok(()),

        // Another writer already made this change, or ended the assignment first
        (a, b) if a == b => Err(DomainError::Conflict(format!(
            "Assignment is already {}",
            a
        ))),
        (Cancelled, _) => Err(DomainError::Conflict(
            "Assignment was cancelled concurrently".to_string(),
        )),

        _ => Err(DomainError::ValidationError(format!(
            "Invalid assignment transition from {} to {}",
            from, to
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AssignmentStatus::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(validate_transition(Waitlisted, Assigned).is_ok());
        assert!(validate_transition(Assigned, Cancelled).is_ok());
        assert!(validate_transition(Waitlisted, Cancelled).is_ok());
    }

    #[test]
    fn test_demotion_rejected() {
        assert!(matches!(
            validate_transition(Assigned, Waitlisted),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        // Surfaces as a lost race so a promoter moves on to the next entry
        assert!(matches!(
            validate_transition(Cancelled, Assigned),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            validate_transition(Cancelled, Waitlisted),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn test_repeat_transition_is_conflict() {
        assert!(matches!(
            validate_transition(Assigned, Assigned),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            validate_transition(Cancelled, Cancelled),
            Err(DomainError::Conflict(_))
        ));
    }
}
