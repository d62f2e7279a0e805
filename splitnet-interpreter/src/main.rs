#![warn(clippy::uninlined_format_args)]

mod input;
mod render;

use std::{borrow::Cow, env, fs, process};

use splitnet_application::{SettlementConfig, SettlementService};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let Some(path) = env::args().nth(1) else {
        return Err("Usage: splitnet-interpreter <group.json>".into());
    };

    let config = SettlementConfig::from_env().map_err(|err| err.to_string())?;

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let group = input::parse_group(&source)
        .map_err(|err| format!("Failed to parse '{path}': {err}"))?;

    tracing::info!(
        path = %path,
        member_count = group.members.len(),
        expense_count = group.expenses.len(),
        "Loaded group snapshot"
    );

    let service = SettlementService::new(config);
    let result = service.settle(&group).map_err(|err| err.to_string())?;

    print!(
        "{}",
        render::render_settlement(&result, &group, config.currency_scale)
    );
    Ok(())
}
