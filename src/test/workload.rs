//! Crash workload. Feeds loosely formed bundle inputs through construction
//! and every read operation, checking that nothing panics and that every
//! named order is a total order. Driven by the fuzzing harness in `fuzz/`
//! and by the property tests.

use std::io;

use crate::{
    config::EngineConfig,
    feedback::ResponseView,
    results::{BundleInput, ResultsBundle, order::ResponseOrder},
};

const WORKLOAD_KEY: &str = "workload-key";

/// Bundles larger than this are skipped by the pairwise order check, which
/// is quadratic.
const MAX_PAIRWISE: usize = 64;

pub fn run(data: &[u8]) {
    let Ok(input) = serde_json::from_slice::<BundleInput>(data) else {
        return;
    };
    let Ok(bundle) = ResultsBundle::build(input, &EngineConfig::with_key(WORKLOAD_KEY))
    else {
        return;
    };

    exercise(&bundle);
}

/// Runs every query on `bundle` and checks the ordering laws.
pub fn exercise(bundle: &ResultsBundle) {
    check_total_orders(bundle);

    for by_team in [false, true] {
        bundle.responses_by_recipient(by_team);
        bundle.responses_by_giver(by_team);
        bundle.responses_by_recipient_giver_question(by_team);
        bundle.responses_by_giver_recipient_question(by_team);
        bundle.responses_by_recipient_question_giver(by_team);
        bundle.responses_by_giver_question_recipient(by_team);
    }
    bundle.question_response_map();
    bundle.question_response_map_sorted_by_recipient();
    bundle.question_response_map_by_recipient_team();
    bundle.question_response_map_by_giver_team();

    for response in bundle.responses() {
        bundle.csv_instructor_comments(response);
        bundle.csv_participant_comment(response);
        bundle.displayable_email_giver(response);
        bundle.displayable_email_recipient(response);
    }

    assert!(bundle.write_csv(io::sink()).is_ok());
}

pub fn check_total_orders(bundle: &ResultsBundle) {
    let responses = bundle.responses();
    if responses.len() > MAX_PAIRWISE {
        return;
    }

    for order in ResponseOrder::ALL {
        for a in responses {
            for b in responses {
                let forward = bundle.compare(order, a, b);
                assert_eq!(
                    forward,
                    bundle.compare(order, b, a).reverse(),
                    "{order:?} is not antisymmetric for {} and {}",
                    a.id(),
                    b.id()
                );
                assert_eq!(
                    forward.is_eq(),
                    a.id() == b.id(),
                    "{order:?} ties {} and {}",
                    a.id(),
                    b.id()
                );
            }
        }
    }
}
