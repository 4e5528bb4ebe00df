//! Property-based tests for VisitTracker operations.
//!
//! For any sequence of scroll samples and polls on one page view, the
//! maximum scroll depth never decreases and the visit validates at most once.

use proptest::prelude::*;
use smart_history::managers::visit_tracker::{VisitTracker, VisitTrackerTrait};
use smart_history::types::settings::VisitSettings;
use smart_history::types::visit::ScrollSample;

const T0: i64 = 1_700_000_000_000;

#[derive(Debug, Clone)]
enum VisitOp {
    Scroll { top: f64, height: f64, viewport: f64 },
    Poll,
}

fn arb_ops() -> impl Strategy<Value = Vec<(VisitOp, i64)>> {
    prop::collection::vec(
        (
            prop_oneof![
                3 => (-100.0f64..5000.0, 0.0f64..4000.0, 100.0f64..1200.0)
                    .prop_map(|(top, height, viewport)| VisitOp::Scroll { top, height, viewport }),
                1 => Just(VisitOp::Poll),
            ],
            0i64..2_000,
        ),
        1..80,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn max_scroll_is_monotonic_and_validation_fires_once(ops in arb_ops()) {
        let thresholds = VisitSettings::default();
        let mut tracker = VisitTracker::new();
        tracker.complete_navigation(1, "https://example.com/", "Example", None, T0);

        let mut now = T0;
        let mut previous_max = 0.0f64;
        let mut fired = 0usize;

        for (op, advance) in ops {
            now += advance;
            let events = match op {
                VisitOp::Scroll { top, height, viewport } => {
                    let sample = ScrollSample { scroll_top: top, scroll_height: height, viewport_height: viewport };
                    tracker.record_scroll(1, sample, now, &thresholds).unwrap().into_iter().collect::<Vec<_>>()
                }
                VisitOp::Poll => tracker.poll(now, &thresholds),
            };
            fired += events.len();

            let visit = tracker.get_visit(1).unwrap();
            prop_assert!(visit.max_scroll_percentage >= previous_max);
            prop_assert!((0.0..=100.0).contains(&visit.max_scroll_percentage));
            previous_max = visit.max_scroll_percentage;
            prop_assert_eq!(visit.validated, fired == 1);
        }

        prop_assert!(fired <= 1);
    }

    #[test]
    fn navigation_always_resets(depth in 0.0f64..100.0, elapsed in 0i64..100_000) {
        let thresholds = VisitSettings::default();
        let mut tracker = VisitTracker::new();
        tracker.complete_navigation(7, "https://a.test/", "A", None, T0);
        let sample = ScrollSample { scroll_top: depth * 10.0, scroll_height: 1500.0, viewport_height: 500.0 };
        tracker.record_scroll(7, sample, T0 + elapsed, &thresholds).unwrap();

        tracker.complete_navigation(7, "https://a.test/next", "A2", None, T0 + elapsed);
        let visit = tracker.get_visit(7).unwrap();
        prop_assert_eq!(visit.max_scroll_percentage, 0.0);
        prop_assert!(!visit.validated);
    }
}
