//! End-to-end scenarios for the studio, driven through the headless host.

use std::cell::RefCell;
use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use cutup_core::geometry::{Rect, Size};
use cutup_core::headless::{
    HeadlessPage, MemoryClipboard, MemoryDownloads, ScriptedTransport, advance_clock,
};
use cutup_core::studio::{
    BUSY_MESSAGE, COPY_ALL_MESSAGE, DOWNLOADED_MESSAGE, NOTHING_TO_COPY_MESSAGE,
    NOTHING_TO_DOWNLOAD_MESSAGE, VALIDATION_MESSAGE,
};
use cutup_core::tooltip::TooltipKind;
use cutup_core::{
    GenerateError, GenerateRequest, MessageLevel, PhraseRecord, SourceRef, Studio, StudioConfig,
    copy_all, copy_one, generate,
};
use pretty_assertions::assert_eq;
use time::{Date, Month};

// ── Helpers ───────────────────────────────────────────────────────────

fn studio_on(page: HeadlessPage) -> RefCell<Studio<HeadlessPage>> {
    RefCell::new(Studio::new(page, StudioConfig::default()))
}

fn studio() -> RefCell<Studio<HeadlessPage>> {
    studio_on(HeadlessPage::new())
}

fn batch(n: usize) -> Vec<PhraseRecord> {
    (0..n)
        .map(|i| {
            PhraseRecord::new(
                format!("phrase {i}"),
                vec![
                    SourceRef::new(format!("w{i}"), "alpha.txt"),
                    SourceRef::new(format!("v{i}"), "beta.txt"),
                ],
            )
        })
        .collect()
}

fn texts(texts: &[&str]) -> Vec<PhraseRecord> {
    texts
        .iter()
        .map(|t| PhraseRecord::new(*t, vec![SourceRef::new(*t, "src.txt")]))
        .collect()
}

fn load(studio: &RefCell<Studio<HeadlessPage>>, phrases: &[PhraseRecord]) {
    let transport = ScriptedTransport::new();
    transport.push_phrases(phrases);
    pollster::block_on(generate(studio, &transport, &phrases.len().max(1).to_string()))
        .expect("generation succeeds");
}

fn may_day() -> Date {
    Date::from_calendar_date(2024, Month::May, 1).unwrap()
}

// ── Generation ────────────────────────────────────────────────────────

#[test]
fn generate_fifty_fills_store_and_reports_count() {
    let studio = studio();
    let transport = ScriptedTransport::new();
    transport.push_phrases(&batch(50));

    let n = pollster::block_on(generate(&studio, &transport, "50")).unwrap();
    assert_eq!(n, 50);
    assert_eq!(transport.requests(), vec![GenerateRequest { count: 50 }]);

    let s = studio.borrow();
    assert_eq!(s.store().len(), 50);
    let shown = s.page().message().unwrap();
    assert_eq!(shown.text, "50個のフレーズを生成しました");
    assert_eq!(shown.level, MessageLevel::Success);
    assert_eq!(s.page().rendered().len(), 50);
    assert_eq!(s.page().reveal_count(), 1);
    assert!(!s.page().loading());
}

#[test]
fn generate_out_of_range_sends_nothing() {
    let studio = studio();
    load(&studio, &texts(&["keep"]));

    let transport = ScriptedTransport::new();
    let err = pollster::block_on(generate(&studio, &transport, "150")).unwrap_err();
    assert!(matches!(err, GenerateError::Validation(_)));
    assert!(transport.requests().is_empty());

    let s = studio.borrow();
    assert_eq!(s.store().get(), texts(&["keep"]).as_slice());
    let shown = s.page().message().unwrap();
    assert_eq!(shown.text, VALIDATION_MESSAGE);
    assert_eq!(shown.level, MessageLevel::Error);
    assert!(!s.page().loading());
}

#[test]
fn unparsable_count_defaults_to_fifty() {
    let studio = studio();
    let transport = ScriptedTransport::new();
    transport.push_phrases(&batch(50));
    pollster::block_on(generate(&studio, &transport, "")).unwrap();
    assert_eq!(transport.requests(), vec![GenerateRequest { count: 50 }]);
}

#[test]
fn http_500_reports_status_and_keeps_store() {
    let studio = studio();
    load(&studio, &texts(&["before"]));

    let transport = ScriptedTransport::new();
    transport.push_json(500, r#"{"error":"Generation error: boom"}"#);
    let err = pollster::block_on(generate(&studio, &transport, "10")).unwrap_err();
    assert!(matches!(err, GenerateError::Http { status: 500, .. }));

    let s = studio.borrow();
    let shown = s.page().message().unwrap();
    assert!(shown.text.contains("500"), "message was {:?}", shown.text);
    assert_eq!(shown.level, MessageLevel::Error);
    assert_eq!(s.store().get(), texts(&["before"]).as_slice());
    assert!(!s.page().loading());
    assert!(s.page().generate_enabled());
}

#[test]
fn store_round_trips_response_exactly() {
    let studio = studio();
    let phrases = vec![
        PhraseRecord::new(r#"it's a "test" \ <i>"#, vec![SourceRef::new("it's", "q'uote.txt")]),
        PhraseRecord::new("二行目", Vec::new()),
        PhraseRecord::new(
            "c",
            vec![SourceRef::new("z", "z.txt"), SourceRef::new("a", "a.txt")],
        ),
    ];
    load(&studio, &phrases);
    assert_eq!(studio.borrow().store().get(), phrases.as_slice());
}

#[test]
fn overlapping_generate_is_refused_while_in_flight() {
    let studio = studio();
    let transport = ScriptedTransport::new();
    transport.push_phrases(&batch(5));
    transport.hold();

    let mut cx = Context::from_waker(Waker::noop());
    let mut first = pin!(generate(&studio, &transport, "5"));
    assert!(first.as_mut().poll(&mut cx).is_pending());
    {
        let s = studio.borrow();
        assert!(s.page().loading());
        assert!(!s.page().generate_enabled());
    }

    let second = pollster::block_on(generate(&studio, &transport, "7"));
    assert_eq!(second, Err(GenerateError::Busy));
    assert_eq!(transport.requests(), vec![GenerateRequest { count: 5 }]);
    assert_eq!(studio.borrow().page().message().unwrap().text, BUSY_MESSAGE);
    assert!(studio.borrow().page().loading());

    transport.release();
    assert_eq!(first.as_mut().poll(&mut cx), Poll::Ready(Ok(5)));
    let s = studio.borrow();
    assert!(!s.page().loading());
    assert_eq!(s.store().len(), 5);
}

// ── Rendering and tooltips ────────────────────────────────────────────

#[test]
fn rerender_is_idempotent_and_rebinds() {
    let studio = studio();
    load(&studio, &batch(3));
    let first: Vec<_> = studio.borrow().page().rendered().to_vec();
    load(&studio, &batch(3));
    let second: Vec<_> = studio.borrow().page().rendered().to_vec();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.text, b.text);
        assert_eq!(a.source_hint, b.source_hint);
    }

    let mut s = studio.borrow_mut();
    assert!(!s.on_source_enter(first[1].key), "stale binding still live");
    assert!(s.page().tooltips().is_empty());
    assert!(s.on_source_enter(second[1].key));
    assert_eq!(s.page().tooltips_of(TooltipKind::Hover).len(), 1);
}

#[test]
fn only_one_hover_tooltip_at_a_time() {
    let studio = studio();
    load(&studio, &batch(4));
    let keys: Vec<_> = studio.borrow().page().rendered().iter().map(|v| v.key).collect();

    let mut s = studio.borrow_mut();
    for key in &keys {
        assert!(s.on_source_enter(*key));
        assert_eq!(s.page().tooltips_of(TooltipKind::Hover).len(), 1);
    }
    let shown = &s.page().tooltips_of(TooltipKind::Hover)[0];
    assert_eq!(shown.content.sources[0].word, "w3");
}

#[test]
fn hover_clamps_to_viewport_right_edge() {
    let page = HeadlessPage::new()
        .with_viewport_width(800.0)
        .with_tooltip_size(Size::new(260.0, 100.0));
    let studio = studio_on(page);
    load(&studio, &batch(1));
    let key = studio.borrow().page().rendered()[0].key;

    let mut s = studio.borrow_mut();
    s.page_mut().set_anchor(0, Rect::new(700.0, 400.0, 60.0, 18.0));
    assert!(s.on_source_enter(key));
    let bounds = s.page().tooltips_of(TooltipKind::Hover)[0].bounds().unwrap();
    assert!(bounds.right() <= 800.0);
    assert_eq!(bounds.right(), 790.0);
    assert_eq!(bounds.top(), 400.0 - 100.0 - 10.0);
}

#[test]
fn hover_flips_below_when_above_would_leave_viewport() {
    let studio = studio();
    load(&studio, &batch(1));
    let key = studio.borrow().page().rendered()[0].key;

    let mut s = studio.borrow_mut();
    let anchor = Rect::new(40.0, 30.0, 60.0, 18.0);
    s.page_mut().set_anchor(0, anchor);
    s.on_source_enter(key);
    let bounds = s.page().tooltips_of(TooltipKind::Hover)[0].bounds().unwrap();
    assert_eq!(bounds.top(), anchor.bottom() + 10.0);
    assert!(bounds.top() >= 0.0);
}

#[test]
fn tap_toggles_panel_without_copying() {
    let studio = studio();
    load(&studio, &batch(2));
    let key = studio.borrow().page().rendered()[0].key;
    let before = studio.borrow().page().message().cloned();

    {
        let mut s = studio.borrow_mut();
        assert!(s.on_source_tap(key));
        assert_eq!(s.page().tooltips_of(TooltipKind::Tap).len(), 1);
        assert!(!s.on_source_tap(key));
        assert!(s.page().tooltips_of(TooltipKind::Tap).is_empty());
    }
    assert_eq!(studio.borrow().page().message().cloned(), before);
}

// ── Export ────────────────────────────────────────────────────────────

#[test]
fn copy_all_joins_store_with_newlines() {
    let studio = studio();
    load(&studio, &texts(&["aa", "bb"]));
    let clipboard = MemoryClipboard::new();
    pollster::block_on(copy_all(&studio, &clipboard)).unwrap();

    assert_eq!(clipboard.writes(), vec!["aa\nbb".to_string()]);
    let s = studio.borrow();
    let shown = s.page().message().unwrap();
    assert_eq!(shown.text, COPY_ALL_MESSAGE);
    assert_eq!(shown.level, MessageLevel::Success);
}

#[test]
fn copy_one_copies_text_verbatim() {
    let studio = studio();
    load(&studio, &texts(&["a'b\"c\\d"]));
    let key = studio.borrow().page().rendered()[0].key;
    let clipboard = MemoryClipboard::new();
    pollster::block_on(copy_one(&studio, &clipboard, key)).unwrap();
    assert_eq!(clipboard.writes(), vec!["a'b\"c\\d".to_string()]);
}

#[test]
fn download_is_named_after_the_date() {
    let studio = studio();
    load(&studio, &texts(&["aa", "bb"]));
    let downloads = MemoryDownloads::new();
    studio.borrow_mut().download_all(&downloads, may_day()).unwrap();

    let artifacts = downloads.artifacts();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].file_name, "cutup-phrases-2024-05-01.txt");
    assert_eq!(artifacts[0].content, "aa\nbb");
    assert_eq!(
        studio.borrow().page().message().unwrap().text,
        DOWNLOADED_MESSAGE
    );
}

#[test]
fn empty_store_exports_nothing() {
    let studio = studio();
    let clipboard = MemoryClipboard::new();
    let downloads = MemoryDownloads::new();

    pollster::block_on(copy_all(&studio, &clipboard)).unwrap();
    assert_eq!(clipboard.attempts(), 0);
    assert_eq!(
        studio.borrow().page().message().unwrap().text,
        NOTHING_TO_COPY_MESSAGE
    );

    studio.borrow_mut().download_all(&downloads, may_day()).unwrap();
    assert_eq!(downloads.attempts(), 0);
    let s = studio.borrow();
    let shown = s.page().message().unwrap();
    assert_eq!(shown.text, NOTHING_TO_DOWNLOAD_MESSAGE);
    assert_eq!(shown.level, MessageLevel::Error);
}

// ── Messages ──────────────────────────────────────────────────────────

#[test]
fn message_hides_three_seconds_after_it_was_shown() {
    let studio = studio();
    let mut s = studio.borrow_mut();
    s.notify("first", MessageLevel::Info);
    advance_clock(&mut s, Duration::from_secs(2));
    s.notify("second", MessageLevel::Success);

    advance_clock(&mut s, Duration::from_secs(1));
    assert!(s.page().message().unwrap().visible, "old expiry hid new text");

    advance_clock(&mut s, Duration::from_secs(2));
    let shown = s.page().message().unwrap();
    assert_eq!(shown.text, "second");
    assert!(!shown.visible);
}

#[test]
fn missing_message_slot_alerts_instead() {
    let page = HeadlessPage::new().without(cutup_core::ElementHook::Message);
    let studio = studio_on(page);
    let transport = ScriptedTransport::new();
    let _ = pollster::block_on(generate(&studio, &transport, "0"));
    assert_eq!(studio.borrow().page().alerts(), [VALIDATION_MESSAGE.to_string()]);
}
