use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::helpers::{marks_param, required_text, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::roster::UpdateField;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match store_ref(state, req) {
        Ok(store) => ok(&req.id, json!({ "students": store.roster().records() })),
        Err(resp) => resp,
    }
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let name = match required_text(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({ "student": store.roster().find_by_name(&name) }),
    )
}

fn handle_students_find(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let identifier = match required_text(req, "identifier") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.roster().find(&identifier) {
        Some(r) => ok(&req.id, json!({ "student": r })),
        None => err(
            &req.id,
            "not_found",
            format!("Student not found: {}", identifier.trim()),
            Some(json!({ "identifier": identifier.trim() })),
        ),
    }
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let code = match required_text(req, "code") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match required_text(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let marks = match marks_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let exam = match required_text(req, "exam") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let [m1, m2, m3] = &marks;

    match store.add(&code, &name, [m1.as_str(), m2.as_str(), m3.as_str()], &exam) {
        Ok(record) => ok(&req.id, json!({ "student": record })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let identifier = match required_text(req, "identifier") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let field = match required_text(req, "field") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let value = match required_text(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let field = match field.parse::<UpdateField>() {
        Ok(f) => f,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    match store.update(&identifier, field, &value) {
        Ok(record) => ok(&req.id, json!({ "student": record })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let identifier = match required_text(req, "identifier") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.delete(&identifier) {
        Ok(removed) => ok(&req.id, json!({ "student": removed })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let ascending = req
        .params
        .get("ascending")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    store.sort(ascending);
    ok(&req.id, json!({ "students": store.roster().records() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.find" => Some(handle_students_find(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.sort" => Some(handle_students_sort(state, req)),
        _ => None,
    }
}
