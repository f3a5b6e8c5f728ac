//! The chained panic hook reports panics as uncaught errors.
//!
//! Lives in its own test binary: the hook is process-wide.

use std::panic::catch_unwind;
use std::sync::Mutex;

use cutup_core::error_boundary::{UNCAUGHT_PREFIX, install_panic_hook};

static REPORTED: Mutex<Vec<String>> = Mutex::new(Vec::new());

#[test]
fn panic_is_reported_with_its_message() {
    install_panic_hook(|text| {
        if let Ok(mut reported) = REPORTED.lock() {
            reported.push(text.to_string());
        }
    });

    let result = catch_unwind(|| panic!("renderer exploded"));
    assert!(result.is_err());

    let reported = REPORTED.lock().unwrap();
    assert_eq!(
        reported.as_slice(),
        [format!("{UNCAUGHT_PREFIX}: renderer exploded")]
    );
}
