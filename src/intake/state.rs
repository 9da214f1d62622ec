//! Intake state: which step of the insurance flow a session is in.

use serde::{Deserialize, Serialize};

/// The states of the intake conversation.
///
/// Progresses linearly: Initial → AwaitingIdentityDocument →
/// AwaitingVehicleDocument → AwaitingDataConfirmation →
/// AwaitingPriceConfirmation → Finished. Rejections and the restart command
/// move backwards to AwaitingIdentityDocument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeState {
    #[default]
    Initial,
    AwaitingIdentityDocument,
    AwaitingVehicleDocument,
    AwaitingDataConfirmation,
    AwaitingPriceConfirmation,
    Finished,
}

impl IntakeState {
    pub const ALL: [IntakeState; 6] = [
        Self::Initial,
        Self::AwaitingIdentityDocument,
        Self::AwaitingVehicleDocument,
        Self::AwaitingDataConfirmation,
        Self::AwaitingPriceConfirmation,
        Self::Finished,
    ];

    /// Check if a transition from `self` to `target` is part of the flow.
    pub fn can_transition_to(&self, target: IntakeState) -> bool {
        use IntakeState::*;
        matches!(
            (self, target),
            (Initial, AwaitingIdentityDocument)
                | (AwaitingIdentityDocument, AwaitingVehicleDocument)
                | (AwaitingVehicleDocument, AwaitingDataConfirmation)
                | (AwaitingDataConfirmation, AwaitingPriceConfirmation)
                | (AwaitingDataConfirmation, AwaitingIdentityDocument)
                | (AwaitingPriceConfirmation, Finished)
                | (AwaitingPriceConfirmation, AwaitingIdentityDocument)
        )
    }

    /// Whether a session in this state must carry extracted document data.
    pub fn holds_extraction(&self) -> bool {
        matches!(
            self,
            Self::AwaitingDataConfirmation | Self::AwaitingPriceConfirmation | Self::Finished
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for IntakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::AwaitingIdentityDocument => "awaiting_identity_document",
            Self::AwaitingVehicleDocument => "awaiting_vehicle_document",
            Self::AwaitingDataConfirmation => "awaiting_data_confirmation",
            Self::AwaitingPriceConfirmation => "awaiting_price_confirmation",
            Self::Finished => "finished",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_valid() {
        use IntakeState::*;
        let forward = [
            (Initial, AwaitingIdentityDocument),
            (AwaitingIdentityDocument, AwaitingVehicleDocument),
            (AwaitingVehicleDocument, AwaitingDataConfirmation),
            (AwaitingDataConfirmation, AwaitingPriceConfirmation),
            (AwaitingPriceConfirmation, Finished),
        ];
        for (from, to) in forward {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn skipping_steps_is_invalid() {
        use IntakeState::*;
        assert!(!Initial.can_transition_to(AwaitingVehicleDocument));
        assert!(!AwaitingIdentityDocument.can_transition_to(AwaitingDataConfirmation));
        assert!(!AwaitingVehicleDocument.can_transition_to(Finished));
        assert!(!Finished.can_transition_to(Initial));
        // Self-transition
        assert!(!AwaitingVehicleDocument.can_transition_to(AwaitingVehicleDocument));
    }

    #[test]
    fn extraction_is_held_from_data_confirmation_on() {
        use IntakeState::*;
        assert!(!Initial.holds_extraction());
        assert!(!AwaitingIdentityDocument.holds_extraction());
        assert!(!AwaitingVehicleDocument.holds_extraction());
        assert!(AwaitingDataConfirmation.holds_extraction());
        assert!(AwaitingPriceConfirmation.holds_extraction());
        assert!(Finished.holds_extraction());
    }

    #[test]
    fn only_finished_is_terminal() {
        for state in IntakeState::ALL {
            assert_eq!(state.is_terminal(), state == IntakeState::Finished);
        }
    }

    #[test]
    fn display_matches_serde() {
        for state in IntakeState::ALL {
            let display = format!("{state}");
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(format!("\"{display}\""), json, "mismatch for {state:?}");
        }
    }

    #[test]
    fn default_is_initial() {
        assert_eq!(IntakeState::default(), IntakeState::Initial);
    }
}
