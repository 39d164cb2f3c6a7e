//! pagewire-client
//!
//! Headless driver: fires one DOM event against a page fixture and a live
//! server, then reports what the page did.
//!
//! usage: pagewire-client <config.yaml> <page.yaml> <click|change|submit> <element-id>

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use pagewire_client::{app_state::ClientState, bindings::EventCategory, config, feedback, page, transport};
use pagewire_core::error::{PageWireError, Result};

const USAGE: &str = "usage: pagewire-client <config.yaml> <page.yaml> <click|change|submit> <element-id>";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(kind = e.kind().as_str(), error = %e, "pagewire-client failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [cfg_path, page_path, category, element] = args.as_slice() else {
        return Err(PageWireError::BadConfig(USAGE.into()));
    };

    let cfg = config::load_from_file(cfg_path)?;
    let category: EventCategory = category.parse()?;
    let page = Arc::new(page::load_page_from_file(page_path)?);
    let transport = Arc::new(transport::HttpTransport::new(cfg.base_url()?)?);

    let state = ClientState::new(
        cfg,
        page.clone(),
        transport,
        Arc::new(feedback::TracingToastRenderer),
    )?;
    state.ready();

    let outcome = state.handle_event(category, element).await?;
    state.presenter().settle().await;

    match outcome {
        Some(o) => println!("outcome: {o:?}"),
        None => println!("outcome: no binding for {} on {element}", category.as_str()),
    }
    for ev in page.history() {
        println!("page: {ev:?}");
    }
    print!("{}", state.metrics().render());
    Ok(())
}
