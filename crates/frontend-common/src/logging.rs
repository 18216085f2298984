//! Browser console logging

use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_web::MakeWebConsoleWriter;

static INIT: Once = Once::new();

/// Route `tracing` events and `log` records to the browser console
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    INIT.call_once(|| {
        wasm_logger::init(wasm_logger::Config::default());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .without_time() // std::time is unavailable in the browser
            .with_target(true)
            .with_writer(MakeWebConsoleWriter::new());

        if let Err(error) = tracing_subscriber::registry().with(fmt_layer).try_init() {
            tracing::warn!(%error, "tracing subscriber already installed");
        }
    });
}
