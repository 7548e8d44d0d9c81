//! `rcinfo lookup <regno>` – one lookup, printed to stdout.

use anyhow::{Context, Result};
use rcinfo_core::config::RcConfig;
use rcinfo_core::lookup::{RcApiClient, VehicleLookup};
use rcinfo_core::regno;
use rcinfo_core::render::chat::details_plain;
use rcinfo_core::shape::{shape_record, Layout, MaskMode};

#[derive(Debug, Clone, Copy)]
pub struct LookupOptions {
    pub layout: Layout,
    pub mask: Option<MaskMode>,
    pub json: bool,
}

pub async fn run_lookup(cfg: &RcConfig, input: &str, opts: LookupOptions) -> Result<()> {
    let reg = regno::normalize(input)
        .with_context(|| format!("{}\n{}", regno::INVALID_INPUT, regno::FORMAT_HINT))?;
    let client = RcApiClient::new(cfg.upstream.api_url.clone(), cfg.upstream.timeouts());

    let fetch_reg = reg.clone();
    let record = tokio::task::spawn_blocking(move || client.fetch(&fetch_reg))
        .await
        .context("lookup task failed")??;

    let mode = opts.mask.unwrap_or(opts.layout.default_mask_mode());
    let sections = shape_record(&record, opts.layout, mode);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    let heading = record.make_and_model();
    if heading.is_empty() {
        println!("{reg}");
    } else {
        println!("{heading} ({reg})");
    }
    println!("{}", details_plain(&sections));
    Ok(())
}
