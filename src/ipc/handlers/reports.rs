use crate::ipc::error::ok;
use crate::ipc::helpers::{store_ref, text_param};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Whole-roster report, or a single record when `name` is given (exact
/// match, as picked from the stored names).
fn handle_reports_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let text = match text_param(req, "name") {
        Some(name) => store.roster().individual_report(&name),
        None => store.roster().report(),
    };
    ok(&req.id, json!({ "text": text }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.summary" => Some(handle_reports_summary(state, req)),
        _ => None,
    }
}
