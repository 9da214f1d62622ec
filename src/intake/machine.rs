//! The intake state machine.
//!
//! [`step`] is a pure function from a session and an event to the next
//! session and one [`Directive`]. It performs no I/O; the driver executes the
//! directive and decides whether to keep the new session.

use super::directive::{Directive, KeyboardHint};
use super::event::{Answer, Event};
use super::messages;
use super::model::Session;
use super::prompts::PromptKey;
use super::state::IntakeState;

/// Output of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub directive: Directive,
}

impl Transition {
    fn new(session: Session, directive: Directive) -> Self {
        Self { session, directive }
    }
}

/// Advance `session` by one event.
pub fn step(mut session: Session, event: &Event) -> Transition {
    // The restart command pre-empts every per-state rule.
    if matches!(event, Event::Restart) {
        session.restart();
        return Transition::new(session, Directive::fixed(messages::GREETING));
    }

    // Extraction outcomes only mean something while waiting for the vehicle
    // document; anywhere else they are stale and ignored.
    if event.is_extraction_outcome() && session.state != IntakeState::AwaitingVehicleDocument {
        return Transition::new(session, Directive::Noop);
    }

    let directive = match session.state {
        IntakeState::Initial => Directive::Noop,
        IntakeState::AwaitingIdentityDocument => on_identity_document(&mut session, event),
        IntakeState::AwaitingVehicleDocument => on_vehicle_document(&mut session, event),
        IntakeState::AwaitingDataConfirmation => on_data_confirmation(&mut session, event),
        IntakeState::AwaitingPriceConfirmation => on_price_confirmation(&mut session, event),
        IntakeState::Finished => Directive::fixed(messages::THANK_YOU),
    };

    Transition::new(session, directive)
}

fn on_identity_document(session: &mut Session, event: &Event) -> Directive {
    match event {
        Event::Document => {
            session.state = IntakeState::AwaitingVehicleDocument;
            Directive::fixed(messages::IDENTITY_DOCUMENT_RECEIVED)
        }
        _ => Directive::generated(PromptKey::IdentityDocRequested),
    }
}

fn on_vehicle_document(session: &mut Session, event: &Event) -> Directive {
    match event {
        // Stay put until the extraction outcome arrives.
        Event::Document => Directive::RequestExtraction,
        Event::ExtractionCompleted(data) => {
            session.state = IntakeState::AwaitingDataConfirmation;
            session.extracted = Some(data.clone());
            Directive::fixed_with_keyboard(messages::extraction_summary(data), KeyboardHint::YesNo)
        }
        Event::ExtractionFailed | Event::Text(_) | Event::Other | Event::Restart => {
            Directive::generated(PromptKey::VehicleDocRequested)
        }
    }
}

fn on_data_confirmation(session: &mut Session, event: &Event) -> Directive {
    match Answer::of(event) {
        Answer::Yes => {
            session.state = IntakeState::AwaitingPriceConfirmation;
            Directive::generated(PromptKey::DataConfirmed)
        }
        Answer::No => {
            session.restart();
            Directive::generated(PromptKey::DataRejected)
        }
        Answer::Unrecognized => Directive::generated(PromptKey::ReaskConfirmation),
    }
}

fn on_price_confirmation(session: &mut Session, event: &Event) -> Directive {
    match Answer::of(event) {
        Answer::Yes => match session.extracted.clone() {
            Some(data) => {
                session.state = IntakeState::Finished;
                Directive::RequestFinalization { data }
            }
            None => {
                session.restart();
                Directive::fixed(messages::SESSION_EXPIRED)
            }
        },
        Answer::No => Directive::generated(PromptKey::PriceRejected),
        Answer::Unrecognized => Directive::generated(PromptKey::ReaskPrice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::model::{ExtractedData, SessionId};

    fn jane() -> ExtractedData {
        ExtractedData::new("Jane Doe", "AB123456", "VIN001")
    }

    fn session_in(state: IntakeState) -> Session {
        let mut session = Session::new(SessionId::from("test:1"));
        session.state = state;
        if state.holds_extraction() {
            session.extracted = Some(jane());
        }
        session
    }

    fn text(s: &str) -> Event {
        Event::Text(s.to_string())
    }

    /// Events a transport can deliver (no extraction outcomes).
    fn transport_events() -> Vec<Event> {
        vec![
            Event::Document,
            Event::Other,
            text(""),
            text("yes"),
            text("NO"),
            text("hello"),
            text("/help"),
        ]
    }

    #[test]
    fn restart_from_any_state_resets_and_clears() {
        for state in IntakeState::ALL {
            let t = step(session_in(state), &Event::Restart);
            assert_eq!(t.session.state, IntakeState::AwaitingIdentityDocument, "from {state}");
            assert!(t.session.extracted.is_none(), "from {state}");
            assert_eq!(t.directive, Directive::fixed(messages::GREETING));
        }
    }

    #[test]
    fn initial_ignores_everything_but_restart() {
        for event in transport_events() {
            let t = step(session_in(IntakeState::Initial), &event);
            assert_eq!(t.session.state, IntakeState::Initial, "{event:?}");
            assert_eq!(t.directive, Directive::Noop);
        }
    }

    #[test]
    fn restart_then_document_reaches_vehicle_step() {
        let session = Session::new(SessionId::from("test:1"));

        let t = step(session, &Event::Document);
        assert_eq!(t.session.state, IntakeState::Initial);

        let t = step(t.session, &Event::Restart);
        assert_eq!(t.session.state, IntakeState::AwaitingIdentityDocument);

        let t = step(t.session, &Event::Document);
        assert_eq!(t.session.state, IntakeState::AwaitingVehicleDocument);
        assert_eq!(t.directive, Directive::fixed(messages::IDENTITY_DOCUMENT_RECEIVED));
    }

    #[test]
    fn identity_step_reasks_for_non_documents() {
        for event in [text("hi"), Event::Other, text("yes")] {
            let t = step(session_in(IntakeState::AwaitingIdentityDocument), &event);
            assert_eq!(t.session.state, IntakeState::AwaitingIdentityDocument);
            assert_eq!(t.directive, Directive::generated(PromptKey::IdentityDocRequested));
        }
    }

    #[test]
    fn vehicle_document_requests_extraction_without_advancing() {
        let t = step(session_in(IntakeState::AwaitingVehicleDocument), &Event::Document);
        assert_eq!(t.session.state, IntakeState::AwaitingVehicleDocument);
        assert!(t.session.extracted.is_none());
        assert_eq!(t.directive, Directive::RequestExtraction);
    }

    #[test]
    fn extraction_success_caches_and_asks_for_confirmation() {
        let t = step(
            session_in(IntakeState::AwaitingVehicleDocument),
            &Event::ExtractionCompleted(jane()),
        );
        assert_eq!(t.session.state, IntakeState::AwaitingDataConfirmation);
        assert_eq!(t.session.extracted, Some(jane()));
        assert!(t.session.is_consistent());
        match t.directive {
            Directive::SendFixedText { text, keyboard } => {
                assert!(text.contains("Jane Doe"));
                assert!(text.contains("AB123456"));
                assert!(text.contains("VIN001"));
                assert_eq!(keyboard, Some(KeyboardHint::YesNo));
            }
            other => panic!("expected summary text, got {other:?}"),
        }
    }

    #[test]
    fn extraction_failure_reasks_for_vehicle_document() {
        let t = step(
            session_in(IntakeState::AwaitingVehicleDocument),
            &Event::ExtractionFailed,
        );
        assert_eq!(t.session.state, IntakeState::AwaitingVehicleDocument);
        assert!(t.session.extracted.is_none());
        assert_eq!(t.directive, Directive::generated(PromptKey::VehicleDocRequested));
    }

    #[test]
    fn vehicle_step_reasks_for_non_documents() {
        for event in [text("here you go"), Event::Other] {
            let t = step(session_in(IntakeState::AwaitingVehicleDocument), &event);
            assert_eq!(t.session.state, IntakeState::AwaitingVehicleDocument);
            assert_eq!(t.directive, Directive::generated(PromptKey::VehicleDocRequested));
        }
    }

    #[test]
    fn stale_extraction_outcomes_are_ignored() {
        for state in IntakeState::ALL {
            if state == IntakeState::AwaitingVehicleDocument {
                continue;
            }
            for event in [Event::ExtractionCompleted(jane()), Event::ExtractionFailed] {
                let before = session_in(state);
                let t = step(before.clone(), &event);
                assert_eq!(t.session, before, "{state} / {event:?}");
                assert_eq!(t.directive, Directive::Noop);
            }
        }
    }

    #[test]
    fn data_confirmation_yes_moves_to_price() {
        for answer in ["yes", "  YES ", "Yes"] {
            let t = step(session_in(IntakeState::AwaitingDataConfirmation), &text(answer));
            assert_eq!(t.session.state, IntakeState::AwaitingPriceConfirmation);
            assert_eq!(t.session.extracted, Some(jane()));
            assert_eq!(t.directive, Directive::generated(PromptKey::DataConfirmed));
        }
    }

    #[test]
    fn data_confirmation_no_clears_and_restarts_collection() {
        let t = step(session_in(IntakeState::AwaitingDataConfirmation), &text(" No"));
        assert_eq!(t.session.state, IntakeState::AwaitingIdentityDocument);
        assert!(t.session.extracted.is_none());
        assert_eq!(t.directive, Directive::generated(PromptKey::DataRejected));
    }

    #[test]
    fn unrecognized_answers_never_advance_or_clear() {
        let cases = [
            (IntakeState::AwaitingDataConfirmation, PromptKey::ReaskConfirmation),
            (IntakeState::AwaitingPriceConfirmation, PromptKey::ReaskPrice),
        ];
        let events = [
            text(""),
            text("maybe"),
            text("yes!"),
            Event::Document,
            Event::Other,
        ];
        for (state, prompt) in cases {
            for event in &events {
                let t = step(session_in(state), event);
                assert_eq!(t.session.state, state, "{event:?}");
                assert_eq!(t.session.extracted, Some(jane()), "{event:?}");
                assert_eq!(t.directive, Directive::generated(prompt));
            }
        }
    }

    #[test]
    fn price_yes_requests_finalization_with_cached_data() {
        let t = step(session_in(IntakeState::AwaitingPriceConfirmation), &text("YES"));
        assert_eq!(t.session.state, IntakeState::Finished);
        assert_eq!(t.directive, Directive::RequestFinalization { data: jane() });
        assert!(t.session.is_consistent());
    }

    #[test]
    fn price_yes_without_cache_expires_session() {
        let mut session = session_in(IntakeState::AwaitingPriceConfirmation);
        session.extracted = None;

        let t = step(session, &text("yes"));
        assert_eq!(t.session.state, IntakeState::AwaitingIdentityDocument);
        assert!(t.session.extracted.is_none());
        assert_eq!(t.directive, Directive::fixed(messages::SESSION_EXPIRED));
    }

    #[test]
    fn price_no_stays_and_explains() {
        let t = step(session_in(IntakeState::AwaitingPriceConfirmation), &text("no"));
        assert_eq!(t.session.state, IntakeState::AwaitingPriceConfirmation);
        assert_eq!(t.session.extracted, Some(jane()));
        assert_eq!(t.directive, Directive::generated(PromptKey::PriceRejected));
    }

    #[test]
    fn finished_is_idempotent() {
        let mut session = session_in(IntakeState::Finished);
        for event in transport_events() {
            let t = step(session.clone(), &event);
            assert_eq!(t.session, session, "{event:?}");
            assert_eq!(t.directive, Directive::fixed(messages::THANK_YOU));
            session = t.session;
        }
    }

    #[test]
    fn every_observed_transition_is_in_the_flow() {
        let mut events = transport_events();
        events.push(Event::Restart);
        events.push(Event::ExtractionCompleted(jane()));
        events.push(Event::ExtractionFailed);

        for state in IntakeState::ALL {
            for event in &events {
                let t = step(session_in(state), event);
                let to = t.session.state;
                let restart = matches!(event, Event::Restart);
                assert!(
                    to == state || restart || state.can_transition_to(to),
                    "{state} --{}--> {to} is not a flow transition",
                    event.label()
                );
                assert!(t.session.is_consistent(), "{state} / {event:?}");
            }
        }
    }

    #[test]
    fn full_happy_path() {
        let mut session = Session::new(SessionId::from("test:1"));
        let script = [
            Event::Restart,
            Event::Document,
            Event::Document,
            Event::ExtractionCompleted(jane()),
            text("yes"),
            text("yes"),
        ];
        let expected = [
            IntakeState::AwaitingIdentityDocument,
            IntakeState::AwaitingVehicleDocument,
            IntakeState::AwaitingVehicleDocument,
            IntakeState::AwaitingDataConfirmation,
            IntakeState::AwaitingPriceConfirmation,
            IntakeState::Finished,
        ];
        for (event, state) in script.iter().zip(expected) {
            session = step(session, event).session;
            assert_eq!(session.state, state, "after {}", event.label());
        }
        assert_eq!(session.extracted, Some(jane()));
    }
}
