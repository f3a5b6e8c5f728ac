#![forbid(unsafe_code)]

//! Object URL lifetime.

/// An object URL revoked when dropped, on every exit path of its owner.
pub(crate) struct ObjectUrl<R: FnMut(&str)> {
    url: String,
    revoke: R,
}

impl<R: FnMut(&str)> ObjectUrl<R> {
    pub(crate) fn new(url: String, revoke: R) -> Self {
        Self { url, revoke }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.url
    }
}

impl<R: FnMut(&str)> Drop for ObjectUrl<R> {
    fn drop(&mut self) {
        (self.revoke)(&self.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn link_then_fail(revoked: &RefCell<Vec<String>>, fail: bool) -> Result<String, &'static str> {
        let url = ObjectUrl::new("blob:cutup/1".to_string(), |u: &str| {
            revoked.borrow_mut().push(u.to_string());
        });
        if fail {
            return Err("document has no body");
        }
        Ok(url.as_str().to_string())
    }

    #[test]
    fn revoked_after_success() {
        let revoked = RefCell::new(Vec::new());
        assert_eq!(link_then_fail(&revoked, false), Ok("blob:cutup/1".to_string()));
        assert_eq!(revoked.into_inner(), ["blob:cutup/1".to_string()]);
    }

    #[test]
    fn revoked_on_early_error_exit() {
        let revoked = RefCell::new(Vec::new());
        assert!(link_then_fail(&revoked, true).is_err());
        assert_eq!(revoked.into_inner(), ["blob:cutup/1".to_string()]);
    }
}
