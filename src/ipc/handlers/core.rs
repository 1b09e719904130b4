use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::helpers::{required_text, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::store::RosterStore;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "storePath": state.store.as_ref().map(|s| s.path().to_string_lossy().to_string()),
            "studentCount": state.store.as_ref().map(|s| s.roster().len()).unwrap_or(0),
        }),
    )
}

fn handle_roster_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_text(req, "path") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if path.trim().is_empty() {
        return err(&req.id, "bad_params", "path must not be empty", None);
    }

    // A failed load still opens an empty roster bound to the path; the error
    // travels back in the result for the caller to show.
    let (store, report) = RosterStore::open(path.trim());
    let store_path = store.path().to_string_lossy().to_string();
    state.store = Some(store);
    ok(
        &req.id,
        json!({
            "storePath": store_path,
            "loaded": report.loaded,
            "declaredCount": report.declared_count,
            "skipped": report.skipped,
            "loadError": report.load_error,
        }),
    )
}

fn handle_roster_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.save() {
        Ok(()) => ok(
            &req.id,
            json!({
                "storePath": store.path().to_string_lossy(),
                "saved": store.roster().len(),
            }),
        ),
        Err(e) => roster_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "roster.open" => Some(handle_roster_open(state, req)),
        "roster.save" => Some(handle_roster_save(state, req)),
        _ => None,
    }
}
