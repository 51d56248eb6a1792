//! # Cable Sizing CLI
//!
//! Command-line front end for `cable_core`.
//!
//! ```text
//! cable_cli size --load 500 --voltage 400 --length 50 --max-amps 400
//! cable_cli optimize schedule.json --rates rates.json
//! ```
//!
//! A human-readable summary is printed first, followed by the JSON result.
//! Logs go to stderr; set `RUST_LOG=debug` to trace the optimizer.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use cable_core::analysis::OptimizationStatus;
use cable_core::sizing::WarningSeverity;
use cable_core::{
    size_cable_with_rates, CableSchedule, CalcError, CalcResult, ConductorMaterial, InstallationMethod,
    OptimizationReport, OptimizationSettings, RateTable, SizingRequest, SizingResult,
};

/// Exit code for a sizing that completed but is not compliant
const EXIT_NON_COMPLIANT: u8 = 2;

#[derive(Debug, Parser)]
#[command(author, version, about = "Cable sizing and parallel-configuration optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Size one circuit
    Size(SizeArgs),
    /// Analyze a cable schedule for cheaper compliant configurations
    Optimize(OptimizeArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Optimization settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Rate table JSON file (array of rates)
    #[arg(long)]
    rates: Option<PathBuf>,
    /// Print JSON only
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SizeArgs {
    /// Design current (A)
    #[arg(long)]
    load: f64,
    /// Nominal voltage (V)
    #[arg(long, default_value_t = 400.0)]
    voltage: f64,
    /// Route length (m)
    #[arg(long, default_value_t = 0.0)]
    length: f64,
    /// Conductor material: cu, copper, al, aluminium
    #[arg(long, value_parser = parse_material)]
    material: Option<ConductorMaterial>,
    /// Installation method: air, duct, buried
    #[arg(long, value_parser = parse_method)]
    method: Option<InstallationMethod>,
    /// Protective device rating (A)
    #[arg(long)]
    breaker: Option<f64>,
    /// Ambient derating factor
    #[arg(long)]
    derating: Option<f64>,
    /// Explicit voltage-drop limit (%)
    #[arg(long)]
    drop_limit: Option<f64>,
    /// Maximum current per parallel conductor (A)
    #[arg(long)]
    max_amps: Option<f64>,
    /// Preferred current per parallel conductor (A)
    #[arg(long)]
    preferred_amps: Option<f64>,
    /// Cable type label for rate lookup (e.g., "Cu/PVC")
    #[arg(long)]
    cable_type: Option<String>,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct OptimizeArgs {
    /// Cable schedule JSON file
    schedule: PathBuf,
    #[command(flatten)]
    common: CommonArgs,
}

fn parse_material(s: &str) -> Result<ConductorMaterial, String> {
    ConductorMaterial::from_str_flexible(s).map_err(|e| e.to_string())
}

fn parse_method(s: &str) -> Result<InstallationMethod, String> {
    InstallationMethod::from_str_flexible(s).map_err(|e| e.to_string())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Size(args) => run_size(args),
        Commands::Optimize(args) => run_optimize(args),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn read_file(path: &Path) -> CalcResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    Ok(serde_json::from_str(&read_file(path)?)?)
}

fn load_settings(path: Option<&Path>) -> CalcResult<OptimizationSettings> {
    match path {
        Some(path) => {
            let settings: OptimizationSettings = read_json(path)?;
            settings.validate()?;
            debug!(path = %path.display(), "loaded settings");
            Ok(settings)
        }
        None => Ok(OptimizationSettings::default()),
    }
}

fn load_rates(path: Option<&Path>) -> CalcResult<Option<RateTable>> {
    path.map(|p| read_json::<RateTable>(p)).transpose()
}

fn run_size(args: SizeArgs) -> CalcResult<ExitCode> {
    let settings = load_settings(args.common.settings.as_deref())?;
    let rates = load_rates(args.common.rates.as_deref())?;

    let mut request = SizingRequest::from_settings(args.load, args.voltage, args.length, &settings);
    if let Some(material) = args.material {
        request = request.with_material(material);
    }
    if let Some(method) = args.method {
        request = request.with_installation_method(method);
    }
    if let Some(rating) = args.breaker {
        request = request.with_protection_device(rating);
    }
    if let Some(derating) = args.derating {
        request = request.with_derating_factor(derating);
    }
    if let Some(limit) = args.drop_limit {
        request = request.with_voltage_drop_limit(limit);
    }
    if let Some(amps) = args.max_amps {
        request = request.with_max_amps_per_cable(amps);
    }
    if let Some(amps) = args.preferred_amps {
        request = request.with_preferred_amps_per_cable(amps);
    }
    if let Some(cable_type) = args.cable_type {
        request = request.with_cable_type(cable_type);
    }

    let result = size_cable_with_rates(&request, rates.as_ref().unwrap_or(RateTable::reference()))?;

    if !args.common.json {
        print_sizing(&request, &result);
        println!();
        println!("JSON Output:");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if result.passes() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NON_COMPLIANT)
    })
}

fn run_optimize(args: OptimizeArgs) -> CalcResult<ExitCode> {
    let mut schedule = CableSchedule::from_json_str(&read_file(&args.schedule)?)?;
    if args.common.settings.is_some() {
        schedule.settings = load_settings(args.common.settings.as_deref())?;
    }
    if let Some(rates) = load_rates(args.common.rates.as_deref())? {
        schedule.rates = rates;
    }

    let report = schedule.analyze();

    if !args.common.json {
        print_report(&report);
        println!();
        println!("JSON Output:");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}

fn print_sizing(request: &SizingRequest, result: &SizingResult) {
    println!("═══════════════════════════════════════");
    println!("  CABLE SIZING RESULTS");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Load:     {:.1} A at {:.0} V", request.load_amps, request.voltage);
    println!("  Length:   {:.1} m", request.length_m);
    println!("  Cable:    {} {}", result.material, result.installation_method.display_name().to_lowercase());
    if let Some(rating) = request.protection_device_rating {
        println!("  Device:   {:.0} A", rating);
    }
    println!();
    println!("Selection:");
    println!(
        "  {} × {} ({:.1} A per conductor, {:.1} A derated total) {}",
        result.cables_in_parallel,
        result.cable_size,
        result.load_per_cable,
        result.derated_capacity,
        status_icon(result.capacity_sufficient)
    );
    println!(
        "  Voltage drop: {:.2} V ({:.2}% vs {:.1}%)",
        result.voltage_drop_volts, result.voltage_drop_percent, result.voltage_drop_limit_percent
    );
    if result.priced {
        println!(
            "  Cost: {:.2} (supply {:.2}, install {:.2}, termination {:.2})",
            result.total_cost, result.supply_cost, result.install_cost, result.termination_cost
        );
    } else {
        println!("  Cost: unpriced");
    }
    println!();
    println!("Compliance:");
    for check in &result.compliance.checks {
        println!("  {}", check);
    }

    if !result.alternatives.is_empty() {
        println!();
        println!("Alternatives:");
        for alt in &result.alternatives {
            println!(
                "  {}{} × {:<8} {:>12.2}  Vd {:.2}%",
                if alt.is_recommended { "* " } else { "  " },
                alt.cables_in_parallel,
                alt.size,
                alt.cost.total,
                alt.volt_drop_percent
            );
        }
        if let Some(savings) = result.cost_savings {
            println!("  Savings vs most expensive: {:.2}", savings);
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &result.warnings {
            let tag = match w.severity {
                WarningSeverity::Info => "[INFO]",
                WarningSeverity::Warning => "[WARN]",
                WarningSeverity::Error => "[ERROR]",
            };
            println!("  {} {}: {}", tag, w.field, w.message);
        }
    }

    println!();
    println!("═══════════════════════════════════════");
    println!(
        "  RESULT: {}{}",
        if result.passes() { "PASS" } else { "FAIL" },
        if result.requires_engineer_verification {
            " (engineer verification required)"
        } else {
            ""
        }
    );
    println!("═══════════════════════════════════════");
}

fn print_report(report: &OptimizationReport) {
    println!("═══════════════════════════════════════");
    println!("  CABLE OPTIMIZATION REPORT");
    println!("═══════════════════════════════════════");
    println!("  {} - {}", report.job_id, report.project_name);
    println!();
    for result in &report.results {
        let icon = match result.status {
            OptimizationStatus::Optimized | OptimizationStatus::AlreadyOptimal | OptimizationStatus::Unpriced => {
                status_icon(true)
            }
            OptimizationStatus::NoViableConfiguration | OptimizationStatus::Skipped => status_icon(false),
        };
        println!("{} {} - {}", icon, result.label, result.status);
        if let Some(current) = &result.current {
            println!(
                "    installed: {} × {} ({})",
                current.cables_in_parallel,
                current.cable_size,
                if current.compliant { "compliant" } else { "non-compliant" }
            );
        }
        if let Some(best) = &result.recommended {
            if result.status == OptimizationStatus::Unpriced {
                println!(
                    "    cheapest priced: {} × {} at {:.2}",
                    best.cables_in_parallel, best.size, best.cost.total
                );
            } else {
                println!(
                    "    recommended: {} × {} at {:.2}, saves {:.2}",
                    best.cables_in_parallel, best.size, best.cost.total, result.potential_savings
                );
            }
        }
        for note in &result.notes {
            println!("    note: {}", note);
        }
    }
    let s = &report.summary;
    println!();
    println!("═══════════════════════════════════════");
    println!(
        "  {} circuits: {} optimized, {} optimal, {} unpriced, {} no viable, {} skipped",
        s.circuits, s.optimized, s.already_optimal, s.unpriced, s.no_viable_configuration, s.skipped
    );
    println!(
        "  Current {:.2} → optimized {:.2} (savings {:.2})",
        s.current_cost, s.optimized_cost, s.total_potential_savings
    );
    println!("═══════════════════════════════════════");
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_file_error() {
        let path = Path::new("does-not-exist/schedule.json");
        let err = read_file(path).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(matches!(err, CalcError::FileError { ref operation, .. } if operation == "read"));

        let err = load_settings(Some(path)).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_sample_inputs_parse() {
        let samples = Path::new(env!("CARGO_MANIFEST_DIR")).join("samples");
        let schedule = CableSchedule::from_json_str(&read_file(&samples.join("schedule.json")).unwrap()).unwrap();
        assert!(schedule.entry_count() > 0);
        let rates = load_rates(Some(&samples.join("rates.json"))).unwrap().unwrap();
        assert!(!rates.is_empty());
    }
}
