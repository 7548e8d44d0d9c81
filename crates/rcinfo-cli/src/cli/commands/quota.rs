//! `rcinfo quota show|grant|revoke <user>` – inspect or edit the quota file.

use anyhow::Result;
use rcinfo_core::config::RcConfig;
use rcinfo_core::quota::{JsonFileBackend, QuotaBackend, QuotaRecord, QuotaStore};

use crate::cli::QuotaAction;

pub fn run_quota(cfg: &RcConfig, action: QuotaAction) -> Result<()> {
    let store = QuotaStore::new(JsonFileBackend::new(cfg.quota_path()?), cfg.quota);
    apply(&store, action)
}

fn apply<B: QuotaBackend>(store: &QuotaStore<B>, action: QuotaAction) -> Result<()> {
    match action {
        QuotaAction::Show { user } => {
            let rec = store.get_quota(&user)?;
            print_record(&user, &rec);
        }
        QuotaAction::Grant { user, searches } => {
            let granted = searches.unwrap_or(store.policy().premium_searches);
            let rec = store.grant_premium(&user, granted)?;
            println!("Granted premium to {user}");
            print_record(&user, &rec);
        }
        QuotaAction::Revoke { user } => {
            store.revoke_premium(&user)?;
            println!("Revoked premium from {user}");
            print_record(&user, &store.get_quota(&user)?);
        }
    }
    Ok(())
}

fn print_record(user: &str, rec: &QuotaRecord) {
    println!("{:<12} {:<8} {:<6} {}", "USER", "PLAN", "USED", "REMAINING");
    println!(
        "{:<12} {:<8} {:<6} {}",
        user,
        if rec.is_premium { "premium" } else { "free" },
        rec.searches_used,
        rec.remaining_searches
    );
}
