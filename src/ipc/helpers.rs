use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::record::MARK_COUNT;
use crate::store::RosterStore;

/// Presentation layers send form input as strings, but numbers are accepted
/// too and passed on in their textual form.
pub fn text_param(req: &Request, key: &str) -> Option<String> {
    match req.params.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn required_text(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    text_param(req, key).ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn marks_param(req: &Request) -> Result<[String; MARK_COUNT], serde_json::Value> {
    let bad = || {
        err(
            &req.id,
            "bad_params",
            format!("marks must be an array of {MARK_COUNT} values"),
            None,
        )
    };
    let items = req
        .params
        .get("marks")
        .and_then(|v| v.as_array())
        .ok_or_else(bad)?;
    if items.len() != MARK_COUNT {
        return Err(bad());
    }
    let mut out: [String; MARK_COUNT] = Default::default();
    for (slot, v) in out.iter_mut().zip(items) {
        *slot = match v {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return Err(bad()),
        };
    }
    Ok(out)
}

pub fn store_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut RosterStore, serde_json::Value> {
    state
        .store
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_roster", "open a roster first", None))
}

pub fn store_ref<'a>(state: &'a AppState, req: &Request) -> Result<&'a RosterStore, serde_json::Value> {
    state
        .store
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_roster", "open a roster first", None))
}
