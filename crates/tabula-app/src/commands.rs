//! Subcommand execution

use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tabula_core::{FormState, RangeBound, RecordTable};
use tabula_services::{HttpRecordEndpoint, SubmissionController, SubmissionOutcome};
use tabula_settings::ControllerSettings;

use crate::cli::{Cli, Command, FormArgs, TableArgs};
use crate::console::{ConsoleReloader, ConsoleSurface, render_table};
use crate::snapshot::Snapshot;

/// Extra time allowed for the reload task on top of the configured delay
const RELOAD_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = load_settings(&cli)?;
    let args = cli.command.table_args();
    let snapshot = Snapshot::load(&args.snapshot)?;
    let mut table = snapshot.table()?;
    prepare_table(&mut table, args)?;

    let surface = Arc::new(ConsoleSurface::stdout(&settings));
    let reloader = Arc::new(ConsoleReloader::new());
    let endpoint = Arc::new(HttpRecordEndpoint::new(&settings)?);
    let controller = SubmissionController::new(endpoint, surface, reloader.clone(), &settings);

    let outcome = match &cli.command {
        Command::List(_) => {
            print!("{}", render_table(&table));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Delete { yes, .. } => {
            let outcome = controller.request_delete(&table);
            if !matches!(outcome, SubmissionOutcome::AwaitingConfirmation { .. }) {
                return Ok(ExitCode::FAILURE);
            }
            if !yes && !confirm("Delete these records?")? {
                tracing::info!("Delete cancelled");
                return Ok(ExitCode::SUCCESS);
            }
            controller.confirm_delete(&table).await?
        }
        Command::Insert { form: values, .. } => {
            let mut form = snapshot.form()?;
            let session = controller.add(&mut form);
            apply_fields(&mut form, values)?;
            controller.save(&table, &form, &session).await?
        }
        Command::Update { form: values, .. } => {
            let mut form = snapshot.form()?;
            let SubmissionOutcome::Staged(session) = controller.modify(&table, &mut form) else {
                return Ok(ExitCode::FAILURE);
            };
            apply_fields(&mut form, values)?;
            tracing::debug!(id = ?session.target_id(), "Saving update");
            controller.save(&table, &form, &session).await?
        }
    };

    let SubmissionOutcome::Succeeded { reload_in } = outcome else {
        return Ok(ExitCode::FAILURE);
    };

    // The host is expected to refresh the snapshot once the server changed.
    tokio::time::timeout(reload_in + RELOAD_GRACE, reloader.requested())
        .await
        .context("Reload was never requested")?;
    let mut reloaded = Snapshot::load(&args.snapshot)?.table()?;
    prepare_filters(&mut reloaded, args)?;
    print!("{}", render_table(&reloaded));

    Ok(ExitCode::SUCCESS)
}

fn load_settings(cli: &Cli) -> Result<ControllerSettings> {
    let mut settings = match &cli.settings {
        Some(path) => {
            let mut settings = ControllerSettings::load_from(path)?;
            settings.apply_base_url_override(std::env::var(tabula_settings::BASE_URL_ENV).ok());
            settings
        }
        None => ControllerSettings::load()?,
    };
    settings.apply_base_url_override(cli.base_url.clone());
    if let Some(resource) = &cli.resource {
        settings.resource = resource.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// Apply the filter flags, then the checkbox flags.
pub fn prepare_table(table: &mut RecordTable, args: &TableArgs) -> Result<()> {
    prepare_filters(table, args)?;

    let matched = table.check_ids(&args.checked_ids);
    if matched < args.checked_ids.len() {
        tracing::warn!(
            requested = args.checked_ids.len(),
            matched,
            "Some --check ids are not in the snapshot"
        );
    }
    if args.all {
        table.select_all(true);
    }
    Ok(())
}

fn prepare_filters(table: &mut RecordTable, args: &TableArgs) -> Result<()> {
    for (column, needle) in &args.text_filters {
        table
            .set_text_filter(column, needle.as_str())
            .with_context(|| format!("--text {}: not a text column", column))?;
    }
    for range in &args.range_filters {
        table
            .set_range_filter(&range.column, RangeBound::Min, range.min.as_str())
            .with_context(|| format!("--range {}: not a numeric column", range.column))?;
        table.set_range_filter(&range.column, RangeBound::Max, range.max.as_str())?;
    }
    Ok(())
}

pub fn apply_fields(form: &mut FormState, values: &FormArgs) -> Result<()> {
    for (name, value) in &values.fields {
        form.set_value(name, value.as_str())
            .with_context(|| format!("--field {}", name))?;
        form.blur(name)?;
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    let read = std::io::stdin().lock().read_line(&mut answer)?;
    if read == 0 {
        bail!("No answer on stdin, pass --yes to delete without asking");
    }
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
