use crate::ipc::error::ok;
use crate::ipc::helpers::store_ref;
use crate::ipc::types::{AppState, Request};
use crate::record::round_2_decimals;
use serde_json::json;

// Empty roster: `student` is null rather than an error.
fn handle_stats_highest(state: &mut AppState, req: &Request) -> serde_json::Value {
    match store_ref(state, req) {
        Ok(store) => ok(&req.id, json!({ "student": store.roster().highest() })),
        Err(resp) => resp,
    }
}

fn handle_stats_lowest(state: &mut AppState, req: &Request) -> serde_json::Value {
    match store_ref(state, req) {
        Ok(store) => ok(&req.id, json!({ "student": store.roster().lowest() })),
        Err(resp) => resp,
    }
}

fn handle_stats_average(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let roster = store.roster();
    ok(
        &req.id,
        json!({
            "average": round_2_decimals(roster.average()),
            "count": roster.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stats.highest" => Some(handle_stats_highest(state, req)),
        "stats.lowest" => Some(handle_stats_lowest(state, req)),
        "stats.average" => Some(handle_stats_average(state, req)),
        _ => None,
    }
}
