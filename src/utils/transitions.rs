use std::fmt::Debug;

use crate::entities::rental_offer::OfferStatus;
use crate::entities::roadside_assistance_request::AssistanceStatus;
use crate::entities::taxi_rank_trip::TripStatus;
use crate::entities::tender::TenderStatus;
use crate::entities::vehicle_rental_booking::BookingStatus;
use crate::entities::vehicle_rental_request::RequestStatus;
use crate::error::{AppError, AppResult};

/// A status column whose legal moves are fixed up front.
pub trait StatusTransition: Copy + PartialEq + Debug + 'static {
    fn next_states(self) -> &'static [Self];

    fn can_transition_to(self, next: Self) -> bool {
        self.next_states().contains(&next)
    }
}

impl StatusTransition for RequestStatus {
    fn next_states(self) -> &'static [Self] {
        match self {
            RequestStatus::Open => &[RequestStatus::Closed],
            RequestStatus::Closed => &[],
        }
    }
}

impl StatusTransition for OfferStatus {
    fn next_states(self) -> &'static [Self] {
        match self {
            OfferStatus::Pending => &[OfferStatus::Accepted, OfferStatus::Rejected],
            OfferStatus::Accepted | OfferStatus::Rejected => &[],
        }
    }
}

impl StatusTransition for BookingStatus {
    fn next_states(self) -> &'static [Self] {
        match self {
            BookingStatus::Active => &[BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Completed | BookingStatus::Cancelled => &[],
        }
    }
}

impl StatusTransition for TenderStatus {
    fn next_states(self) -> &'static [Self] {
        match self {
            TenderStatus::Open => &[TenderStatus::Closed, TenderStatus::Awarded],
            TenderStatus::Closed => &[TenderStatus::Awarded],
            TenderStatus::Awarded => &[],
        }
    }
}

impl StatusTransition for TripStatus {
    fn next_states(self) -> &'static [Self] {
        match self {
            TripStatus::Scheduled => &[TripStatus::Boarding, TripStatus::Cancelled],
            TripStatus::Boarding => &[TripStatus::Departed, TripStatus::Cancelled],
            TripStatus::Departed => &[TripStatus::Completed],
            TripStatus::Completed | TripStatus::Cancelled => &[],
        }
    }
}

impl StatusTransition for AssistanceStatus {
    fn next_states(self) -> &'static [Self] {
        match self {
            AssistanceStatus::Pending => &[AssistanceStatus::Assigned, AssistanceStatus::Cancelled],
            AssistanceStatus::Assigned => {
                &[AssistanceStatus::InProgress, AssistanceStatus::Cancelled]
            }
            AssistanceStatus::InProgress => &[AssistanceStatus::Completed],
            AssistanceStatus::Completed | AssistanceStatus::Cancelled => &[],
        }
    }
}

/// Reject any move not listed for `from`, including staying put
pub fn ensure_transition<S: StatusTransition>(what: &str, from: S, to: S) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "{} cannot move from {:?} to {:?}",
            what, from, to
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_terminal<S: StatusTransition>(status: S) -> bool {
        status.next_states().is_empty()
    }

    #[test]
    fn test_terminal_states_have_no_moves() {
        assert!(is_terminal(RequestStatus::Closed));
        assert!(is_terminal(OfferStatus::Accepted));
        assert!(is_terminal(TenderStatus::Awarded));
        assert!(is_terminal(TripStatus::Completed));
        assert!(is_terminal(AssistanceStatus::Cancelled));
        assert!(!is_terminal(BookingStatus::Active));
    }

    #[test]
    fn test_completed_booking_cannot_reactivate() {
        assert!(ensure_transition("Booking", BookingStatus::Completed, BookingStatus::Active).is_err());
        assert!(ensure_transition("Booking", BookingStatus::Active, BookingStatus::Completed).is_ok());
    }

    #[test]
    fn test_same_state_is_rejected() {
        let err = ensure_transition("Request", RequestStatus::Open, RequestStatus::Open).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_trip_flow() {
        assert!(TripStatus::Scheduled.can_transition_to(TripStatus::Boarding));
        assert!(TripStatus::Boarding.can_transition_to(TripStatus::Departed));
        assert!(TripStatus::Departed.can_transition_to(TripStatus::Completed));
        assert!(!TripStatus::Departed.can_transition_to(TripStatus::Cancelled));
        assert!(!TripStatus::Scheduled.can_transition_to(TripStatus::Completed));
    }

    #[test]
    fn test_tender_closed_can_still_be_awarded() {
        assert!(TenderStatus::Closed.can_transition_to(TenderStatus::Awarded));
        assert!(!TenderStatus::Awarded.can_transition_to(TenderStatus::Open));
    }

    #[test]
    fn test_offers_are_final_once_decided() {
        assert!(OfferStatus::Pending.can_transition_to(OfferStatus::Rejected));
        assert!(!OfferStatus::Rejected.can_transition_to(OfferStatus::Accepted));
    }

    #[test]
    fn test_roadside_flow() {
        assert!(AssistanceStatus::Pending.can_transition_to(AssistanceStatus::Assigned));
        assert!(AssistanceStatus::Assigned.can_transition_to(AssistanceStatus::InProgress));
        assert!(!AssistanceStatus::InProgress.can_transition_to(AssistanceStatus::Cancelled));
    }
}
