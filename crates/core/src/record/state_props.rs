//! Property-based tests for record flag transitions.

use proptest::prelude::*;

use super::state::{FileCreateState, MailSendState};

fn arb_file_state() -> impl Strategy<Value = FileCreateState> {
    prop_oneof![
        Just(FileCreateState::Pending),
        Just(FileCreateState::Created),
        Just(FileCreateState::Failed),
    ]
}

fn arb_mail_state() -> impl Strategy<Value = MailSendState> {
    prop_oneof![Just(MailSendState::Pending), Just(MailSendState::Sent)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No transition ever lands back on `N`.
    #[test]
    fn prop_file_state_never_regresses_to_pending(from in arb_file_state()) {
        prop_assert!(from.transition(FileCreateState::Pending).is_err());
    }

    /// Only a pending record may fail.
    #[test]
    fn prop_only_pending_may_fail(from in arb_file_state()) {
        let result = from.transition(FileCreateState::Failed);
        prop_assert_eq!(result.is_ok(), from == FileCreateState::Pending);
    }

    /// Any sequence of accepted transitions keeps `E` terminal.
    #[test]
    fn prop_failed_stays_failed(steps in proptest::collection::vec(arb_file_state(), 0..10)) {
        let mut state = FileCreateState::Failed;
        for step in steps {
            if let Ok(next) = state.transition(step) {
                state = next;
            }
        }
        prop_assert_eq!(state, FileCreateState::Failed);
    }

    /// A sent record stays sent.
    #[test]
    fn prop_mail_state_never_reverts(to in arb_mail_state()) {
        prop_assert!(MailSendState::Sent.transition(to).is_err());
    }
}
