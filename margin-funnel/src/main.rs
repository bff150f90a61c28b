use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use margin_core::models::AuditField;
use margin_core::wizard::AuditWizard;
use tokio::io::BufReader;
use tracing::{debug, info};

use margin_funnel::config::FunnelConfig;
use margin_funnel::{app, logging, render, repl};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Clinic margin audit.
///
/// `run` walks the full funnel interactively; `compute` prints the
/// diagnosis for one procedure straight from the command line.
#[derive(Debug, Parser)]
struct Cli {
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = logging::DEFAULT_FILTER)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive funnel on stdin/stdout.
    Run {
        /// TOML settings file. Defaults apply when it does not exist.
        #[arg(long, default_value = "funnel.toml")]
        config: PathBuf,
    },

    /// One-shot margin diagnosis. Values accept Brazilian formatting.
    Compute {
        /// Monthly fixed cost, e.g. `3.000,00`.
        #[arg(long)]
        fixed_cost: String,

        /// Hours the clinic is open per month.
        #[arg(long)]
        open_hours: String,

        #[arg(long, default_value = "Procedimento")]
        name: String,

        #[arg(long)]
        price: String,

        /// Room time in minutes.
        #[arg(long)]
        minutes: String,

        /// Taxes as a percentage of price.
        #[arg(long, default_value = "0")]
        taxes: String,

        /// Commission as a percentage of price.
        #[arg(long, default_value = "0")]
        commission: String,

        /// Materials (CMV) cost per procedure.
        #[arg(long, default_value = "0")]
        cmv: String,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);
    debug!(?cli, "parsed arguments");

    match cli.command {
        Command::Run { config } => run(config).await,
        Command::Compute {
            fixed_cost,
            open_hours,
            name,
            price,
            minutes,
            taxes,
            commission,
            cmv,
        } => {
            let mut wizard = AuditWizard::new();
            for (field, raw) in [
                (AuditField::FixedCost, fixed_cost),
                (AuditField::OpenHours, open_hours),
                (AuditField::ProcedureName, name),
                (AuditField::ProcedurePrice, price),
                (AuditField::ProcedureMinutes, minutes),
                (AuditField::TaxesPercent, taxes),
                (AuditField::CommissionPercent, commission),
                (AuditField::MaterialsCost, cmv),
            ] {
                wizard.set_field(field, &raw);
            }

            if !wizard.request_unlock() {
                let validity = wizard.validity();
                let step = (1..=3).find(|&n| !validity.step(n)).unwrap_or(3);
                anyhow::bail!("audit step {step} is incomplete; check the values for that step");
            }

            print!("{}", render::render_result(&wizard.result()));
            Ok(())
        }
    }
}

async fn run(config_path: PathBuf) -> anyhow::Result<()> {
    let config = FunnelConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }

    let (funnel, events) = app::build_funnel(&config).await?;
    info!("funnel started");

    repl::run_session(
        funnel,
        events,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .context("session failed")?;

    info!("funnel closed");
    Ok(())
}
