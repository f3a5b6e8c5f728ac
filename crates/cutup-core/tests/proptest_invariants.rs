//! Property-based invariants for the studio.
//!
//! Verifies:
//! 1. Out-of-range counts never reach the transport and leave the store alone
//! 2. In-range counts send exactly one request carrying that count
//! 3. Count parsing reads back any rendered integer
//! 4. Popup placement never crosses the viewport's right edge and never
//!    starts above the viewport when placed above its anchor
//! 5. A successful generation stores the response batch unchanged

use std::cell::RefCell;

use cutup_core::geometry::{Rect, Side, Size, place_popup};
use cutup_core::headless::{HeadlessPage, ScriptedTransport};
use cutup_core::request::parse_count;
use cutup_core::{GenerateRequest, PhraseRecord, SourceRef, Studio, StudioConfig, generate};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_out_of_range() -> impl Strategy<Value = i64> {
    prop_oneof![i64::MIN..=0i64, 101i64..=i64::MAX]
}

fn arb_source() -> impl Strategy<Value = SourceRef> {
    ("\\PC{1,8}", "[a-z]{1,8}\\.txt").prop_map(|(w, f)| SourceRef::new(w, f))
}

fn arb_phrase() -> impl Strategy<Value = PhraseRecord> {
    ("\\PC{0,24}", prop::collection::vec(arb_source(), 0..5))
        .prop_map(|(text, sources)| PhraseRecord::new(text, sources))
}

fn fresh() -> RefCell<Studio<HeadlessPage>> {
    RefCell::new(Studio::new(HeadlessPage::new(), StudioConfig::default()))
}

proptest! {
    #[test]
    fn out_of_range_counts_send_nothing(n in arb_out_of_range()) {
        let studio = fresh();
        let transport = ScriptedTransport::new();
        prop_assert!(pollster::block_on(generate(&studio, &transport, &n.to_string())).is_err());
        prop_assert!(transport.requests().is_empty());
        prop_assert!(studio.borrow().store().is_empty());
        prop_assert!(!studio.borrow().page().loading());
    }

    #[test]
    fn in_range_counts_send_exactly_one_request(n in 1u32..=100) {
        let studio = fresh();
        let transport = ScriptedTransport::new();
        transport.push_json(200, r#"{"phrases":[],"count":0}"#);
        let _ = pollster::block_on(generate(&studio, &transport, &n.to_string()));
        prop_assert_eq!(transport.requests(), vec![GenerateRequest { count: n }]);
    }

    #[test]
    fn parse_count_reads_back_integers(n in (i64::MIN + 1)..=i64::MAX, pad in " {0,3}") {
        prop_assert_eq!(parse_count(&format!("{pad}{n}")), Some(n));
    }

    #[test]
    fn placement_stays_inside_viewport_horizontally(
        ax in 0.0f64..2000.0,
        ay in 0.0f64..2000.0,
        w in 1.0f64..400.0,
        h in 1.0f64..400.0,
        vw in 420.0f64..2000.0,
    ) {
        let anchor = Rect::new(ax, ay, 40.0, 20.0);
        let size = Size::new(w, h);
        let p = place_popup(anchor, size, vw, 10.0, 10.0);
        let bounds = p.bounds(size);
        prop_assert!(bounds.right() <= vw);
        match p.side {
            Side::Above => prop_assert!(bounds.top() >= 0.0),
            Side::Below => prop_assert_eq!(bounds.top(), anchor.bottom() + 10.0),
        }
    }

    #[test]
    fn store_equals_response_batch(phrases in prop::collection::vec(arb_phrase(), 1..20)) {
        let studio = fresh();
        let transport = ScriptedTransport::new();
        transport.push_phrases(&phrases);
        let n = pollster::block_on(generate(&studio, &transport, &phrases.len().to_string()));
        prop_assert_eq!(n, Ok(phrases.len()));
        let s = studio.borrow();
        prop_assert_eq!(s.store().get(), phrases.as_slice());
    }
}
