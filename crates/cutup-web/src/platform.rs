#![forbid(unsafe_code)]

//! Browser implementations of the generation, clipboard and download
//! boundaries.

use cutup_core::export::{ClipboardError, ClipboardSink, DownloadArtifact, DownloadError, DownloadSink};
use cutup_core::{GenerateRequest, GenerationTransport, TransportError, TransportResponse};
use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, Document, Headers, HtmlAnchorElement, Request, RequestInit, Response, Url, Window};

use crate::object_url::ObjectUrl;

/// `message` of a JS error-like value.
pub(crate) fn js_message(value: &JsValue) -> Option<String> {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return Some(err.message().into());
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
}

/// Best-effort readable text for a thrown JS value.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    js_message(value)
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

/// `fetch`-based generation transport.
pub(crate) struct FetchTransport {
    window: Window,
    endpoint: String,
}

impl FetchTransport {
    pub(crate) fn new(window: Window, endpoint: String) -> Self {
        Self { window, endpoint }
    }

    async fn send(&self, request: &GenerateRequest) -> Result<TransportResponse, JsValue> {
        let body =
            serde_json::to_string(request).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&self.endpoint, &init)?;
        let response: Response = JsFuture::from(self.window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        Ok(TransportResponse::from_read(
            response.status(),
            read_text(&response).await,
        ))
    }
}

/// Body text of `response`; a rejected read is reported, not thrown.
async fn read_text(response: &Response) -> Result<String, TransportError> {
    let promise = response
        .text()
        .map_err(|err| TransportError(js_error_text(&err)))?;
    let text = JsFuture::from(promise)
        .await
        .map_err(|err| TransportError(js_error_text(&err)))?;
    Ok(text.as_string().unwrap_or_default())
}

impl GenerationTransport for FetchTransport {
    async fn post_generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<TransportResponse, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, count = request.count, "POST");
        self.send(request)
            .await
            .map_err(|err| TransportError(js_error_text(&err)))
    }
}

/// `navigator.clipboard.writeText`.
///
/// Looked up dynamically: the API is absent in insecure contexts.
pub(crate) struct NavigatorClipboard {
    window: Window,
}

impl NavigatorClipboard {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }

    fn write_promise(&self, text: &str) -> Result<Promise, ClipboardError> {
        let navigator = self.window.navigator();
        let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .ok()
            .filter(|c| c.is_object())
            .ok_or(ClipboardError::Unavailable)?;
        let write: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or(ClipboardError::Unavailable)?;
        write
            .call1(&clipboard, &JsValue::from_str(text))
            .and_then(|p| p.dyn_into::<Promise>().map_err(JsValue::from))
            .map_err(|err| ClipboardError::Denied(js_error_text(&err)))
    }
}

impl ClipboardSink for NavigatorClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let promise = self.write_promise(text)?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| ClipboardError::Denied(js_error_text(&err)))
    }
}

/// Blob + object URL + synthetic anchor click.
pub(crate) struct BlobDownloads {
    document: Document,
}

impl BlobDownloads {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn trigger(&self, artifact: &DownloadArtifact) -> Result<(), JsValue> {
        let parts = Array::of1(&JsValue::from_str(&artifact.content));
        let options = BlobPropertyBag::new();
        options.set_type(artifact.mime);
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = ObjectUrl::new(Url::create_object_url_with_blob(&blob)?, |url: &str| {
            if let Err(err) = Url::revoke_object_url(url) {
                tracing::warn!(error = %js_error_text(&err), "object url not revoked");
            }
        });

        let anchor: HtmlAnchorElement = self.document.create_element("a")?.dyn_into()?;
        anchor.set_href(url.as_str());
        anchor.set_download(&artifact.file_name);
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&anchor)?;
        anchor.click();
        body.remove_child(&anchor)?;
        Ok(())
    }
}

impl DownloadSink for BlobDownloads {
    fn download(&self, artifact: &DownloadArtifact) -> Result<(), DownloadError> {
        self.trigger(artifact)
            .map_err(|err| DownloadError::Failed(js_error_text(&err)))
    }
}
