//! Callback hooks wiring session operations into event handlers

use crate::auth::{User, use_session};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Callback taking `(username, password)` that logs in and reports the
/// outcome, with failures already turned into a display message
#[hook]
pub fn use_login_callback(on_result: Callback<Result<User, String>>) -> Callback<(String, String)> {
    let session = use_session();

    Callback::from(move |(username, password): (String, String)| {
        let on_result = on_result.clone();
        let login = session.login(username, password);
        spawn_local(async move {
            on_result.emit(login.await.map_err(|e| e.message()));
        });
    })
}

/// Callback that logs out, for wiring straight to a button
#[hook]
pub fn use_logout_callback() -> Callback<MouseEvent> {
    let session = use_session();
    Callback::from(move |_: MouseEvent| session.logout())
}
