use anyhow::Result;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use timetable_core::sync::{plan_once, sync_once};
use timetable_core::{Settings, TimetableError, VaultStore};
use tracing::error;

use super::SYNC_FAILED_NOTICE;
use crate::client::MtuciClient;
use crate::render::{Render, render_week};
use crate::utils::lock::NotesLock;
use crate::utils::tui;

pub async fn run(settings: Settings, today: Option<NaiveDate>, dry_run: bool) -> Result<()> {
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let client = MtuciClient::new()?;

    if dry_run {
        let spinner = tui::create_spinner("Загрузка расписания");
        let result = plan_once(&settings, &client, today).await;
        spinner.finish_and_clear();

        let prepared = result.map_err(user_facing)?;
        println!("{}", render_week(prepared.plan.anchor, prepared.current_parity));
        println!("{}", prepared.plan.render());
        println!(
            "\n{} {} paths would be cleared under {}",
            "Dry run:".yellow().bold(),
            prepared.plan.stale.len(),
            settings.notes_dir().display()
        );
        return Ok(());
    }

    let _lock = NotesLock::acquire(&settings.notes_dir()).map_err(user_facing)?;
    let mut store = VaultStore::new(settings.vault_path());

    let spinner = tui::create_spinner("Загрузка расписания");
    let result = sync_once(&settings, &client, &mut store, today).await;
    spinner.finish_and_clear();

    let report = result.map_err(user_facing)?;
    println!("{}", render_week(report.plan.anchor, report.current_parity));
    println!("{}", report.render());

    Ok(())
}

/// Fetch problems collapse into one notice; everything else keeps its message.
fn user_facing(err: TimetableError) -> anyhow::Error {
    error!(error = %err, "sync failed");

    if err.is_fetch_failure() {
        anyhow::anyhow!("{SYNC_FAILED_NOTICE}")
    } else {
        err.into()
    }
}
