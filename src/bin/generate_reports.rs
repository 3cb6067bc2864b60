//! Generate the five text reports for one IBGE code and write them to disk.
//!
//! Usage:
//!   generate_reports 2304400
//!   generate_reports 23 --output /tmp/relatorios
//!
//! Files land in `<output>/<code>/`, one `<slug>_<tipo>.txt` per report plus
//! `<slug>_dados.json` with the structured summary.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qedu_reports::utils::text::slug;
use qedu_reports::{ReportGenerator, Settings, TerritoryCode, REPORT_KINDS};

#[derive(Parser, Debug)]
#[command(name = "generate_reports")]
#[command(about = "Generate QEdu education reports for a municipality or state")]
#[command(version)]
struct Args {
    /// IBGE code: 7 digits (municipality) or 2 digits (state)
    ibge: String,

    /// Base output directory (reports go to <DIR>/<ibge>/)
    #[arg(long, short = 'o', value_name = "DIR", default_value = "output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qedu_reports=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let code = TerritoryCode::parse(&args.ibge)?;

    let mut settings = Settings::from_env();
    settings.output_dir = Some(args.output.clone());

    println!("🔄 Gerando relatórios para IBGE {}...", code);
    let generator = ReportGenerator::new(settings);
    let bundle = generator.generate(&code)?;

    let dir = args.output.join(code.as_str());
    let summary_path = dir.join(format!("{}_dados.json", slug(&bundle.entity)));
    let summary = serde_json::to_string_pretty(&bundle.summary)?;
    std::fs::write(&summary_path, summary)
        .with_context(|| format!("Failed to write summary: {}", summary_path.display()))?;

    println!(
        "✅ {} ({}) — {} arquivos em {}",
        bundle.entity,
        bundle.uf,
        bundle.reports.len() + 1,
        dir.display()
    );
    for kind in REPORT_KINDS {
        println!("  📄 {}", bundle.file_name(kind));
    }
    println!("  📄 {}", summary_path.file_name().and_then(|n| n.to_str()).unwrap_or_default());

    Ok(())
}
