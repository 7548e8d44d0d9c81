//! `rcinfo serve` – web search form.

use anyhow::Result;
use rcinfo_core::config::RcConfig;
use rcinfo_core::lookup::RcApiClient;
use rcinfo_core::web::{self, AppState};
use std::sync::Arc;

pub async fn run_serve(cfg: &RcConfig, bind: Option<&str>) -> Result<()> {
    let client = RcApiClient::new(cfg.upstream.api_url.clone(), cfg.upstream.timeouts());
    let state = AppState::new(Arc::new(client)).with_contact(cfg.bot.contact_handle.clone());
    let bind = bind.unwrap_or(&cfg.web.bind);
    println!("Serving on http://{bind}/ (Ctrl+C to stop)");
    web::serve(bind, state).await
}
