// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Valid next statuses for a given current status. Cancelled, completed and
/// no-show are terminal and admit no further transitions.
pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
    match current {
        AppointmentStatus::Scheduled => &[
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ],
        AppointmentStatus::Confirmed => &[
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ],
        AppointmentStatus::Cancelled
        | AppointmentStatus::Completed
        | AppointmentStatus::NoShow => &[],
    }
}

/// Validate that a status transition is allowed.
pub fn validate_status_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), AppointmentError> {
    debug!("Validating status transition from {} to {}", from, to);

    if !valid_transitions(from).contains(&to) {
        warn!("Invalid status transition attempted: {} -> {}", from, to);
        return Err(AppointmentError::InvalidStatusTransition { from, to });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn scheduled_can_confirm_complete_cancel_or_no_show() {
        for to in [
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(validate_status_transition(AppointmentStatus::Scheduled, to).is_ok());
        }
    }

    #[test]
    fn terminal_statuses_admit_no_transitions() {
        for from in [
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
        ] {
            assert_matches!(
                validate_status_transition(from, AppointmentStatus::Scheduled),
                Err(AppointmentError::InvalidStatusTransition { .. })
            );
        }
    }

    #[test]
    fn confirmed_cannot_return_to_scheduled() {
        assert_matches!(
            validate_status_transition(AppointmentStatus::Confirmed, AppointmentStatus::Scheduled),
            Err(AppointmentError::InvalidStatusTransition { .. })
        );
    }
}
