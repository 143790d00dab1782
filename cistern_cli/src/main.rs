//! # Cisterna CLI
//!
//! Command-line front end for the rainwater tank calculator.
//!
//! ```text
//! cisterna regions
//! cisterna size --region sul --area 100 --demand 300
//! cisterna report --region sul --area 100 --demand 300 --output relatorio.pdf
//! ```
//!
//! Area and demand accept pt-BR entry (`1.250,5`) as well as `1250.5`.
//! Errors are printed to stderr and the process exits with status 1.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use log::{debug, info, LevelFilter};
use serde::Serialize;

use cistern_core::calculations::{calculate_with, LimitingFactor, SizingInput, SizingParameters, SizingResult};
use cistern_core::config::CalculatorConfig;
use cistern_core::errors::{CalcError, CalcResult};
use cistern_core::pdf::{render_report_pdf, ReportMetadata, SizingReport};
use cistern_core::presentation::{format_number_trimmed, parse_entry, FormattedSizing, InputEcho};
use cistern_core::regions::RegionTable;

#[derive(Parser, Debug)]
#[command(name = "cisterna")]
#[command(version)]
#[command(about = "Dimensionamento de cisternas pelo Método Prático Alemão", long_about = None)]
struct Cli {
    /// TOML file overriding sizing constants and/or the region table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Apply a run-off coefficient to the capture (e.g., 0.85)
    #[arg(long, global = true)]
    runoff: Option<f64>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available regions and their mean annual rainfall
    Regions,

    /// Size a tank and print the results
    Size(SizingArgs),

    /// Size a tank and write a PDF report
    Report {
        #[command(flatten)]
        sizing: SizingArgs,

        /// Output PDF path
        #[arg(short, long, default_value = "relatorio-cisterna.pdf")]
        output: PathBuf,

        /// Name printed as the person who prepared the report
        #[arg(long)]
        prepared_by: Option<String>,

        /// Client or property owner printed on the report
        #[arg(long)]
        client: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SizingArgs {
    /// Region key (see `cisterna regions`)
    #[arg(short, long)]
    region: Option<String>,

    /// Roof catchment area in m²
    #[arg(short, long, allow_hyphen_values = true)]
    area: String,

    /// Daily non-potable water demand in liters
    #[arg(short, long, allow_hyphen_values = true)]
    demand: String,
}

/// Constants and region table in effect for this run.
struct Settings {
    parameters: SizingParameters,
    regions: RegionTable,
}

impl Settings {
    fn load(config: Option<&Path>, runoff: Option<f64>) -> CalcResult<Self> {
        let config = match config {
            Some(path) => CalculatorConfig::load(path)?,
            None => CalculatorConfig::default(),
        };

        let mut parameters = config.parameters;
        if let Some(coefficient) = runoff {
            parameters = parameters.with_runoff_coefficient(coefficient);
        }
        parameters.validate()?;

        Ok(Settings {
            parameters,
            regions: config.region_table()?,
        })
    }
}

/// JSON shape of `cisterna size --json`.
#[derive(Debug, Serialize)]
struct SizingOutput {
    input: SizingInput,
    parameters: SizingParameters,
    result: SizingResult,
    limiting_factor: LimitingFactor,
    formatted: FormattedSizing,
    echo: InputEcho,
}

fn size(args: &SizingArgs, settings: &Settings) -> CalcResult<(SizingInput, SizingResult)> {
    let input = parse_entry(args.region.as_deref(), &args.area, &args.demand)?;
    let result = calculate_with(&input, &settings.regions, &settings.parameters)?;
    Ok((input, result))
}

fn sizing_output(args: &SizingArgs, settings: &Settings) -> CalcResult<SizingOutput> {
    let (input, result) = size(args, settings)?;
    let region = settings.regions.lookup(&input.region)?;

    Ok(SizingOutput {
        echo: InputEcho::new(region, &input),
        formatted: FormattedSizing::from_result(&result),
        limiting_factor: result.limiting_factor(),
        parameters: settings.parameters,
        input,
        result,
    })
}

fn print_json<T: Serialize>(value: &T) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::Internal {
        message: format!("JSON serialization failed: {}", e),
    })?;
    println!("{}", json);
    Ok(())
}

fn print_regions(regions: &RegionTable) {
    println!("{:<20} {:<24} {:>14}", "Chave", "Região", "Chuva (mm/ano)");
    for region in regions.iter() {
        println!(
            "{:<20} {:<24} {:>14}",
            region.key,
            region.name,
            format_number_trimmed(region.annual_rainfall_mm, 1)
        );
    }
}

fn print_sizing(output: &SizingOutput) {
    let echo = &output.echo;
    let formatted = &output.formatted;

    println!("Região:                 {} ({})", echo.region_name, echo.annual_rainfall);
    println!("Área de captação:       {}", echo.catchment_area);
    println!("Demanda diária:         {}", echo.daily_demand);
    println!();
    println!("Volume do reservatório: {} ({})", formatted.tank_volume, formatted.tank_volume_m3);
    println!("Economia mensal:        {}", formatted.monthly_savings);
    println!("Captação média mensal:  {}", formatted.monthly_capture);
    println!("Demanda mensal:         {}", formatted.monthly_demand);
    println!("Autonomia:              {}", formatted.autonomy);
    println!("Fator limitante:        {}", output.limiting_factor.display_name());
}

fn write_report(
    args: &SizingArgs,
    settings: &Settings,
    output: &Path,
    prepared_by: Option<&str>,
    client: Option<&str>,
) -> CalcResult<SizingReport> {
    let (input, result) = size(args, settings)?;

    let mut meta = ReportMetadata::new();
    if let Some(name) = prepared_by {
        meta = meta.with_prepared_by(name);
    }
    if let Some(client) = client {
        meta = meta.with_client(client);
    }

    let report = SizingReport::new(&input, &result, &settings.regions, settings.parameters, meta)?;
    let pdf_bytes = render_report_pdf(&report)?;

    fs::write(output, &pdf_bytes)
        .map_err(|e| CalcError::file_error("write report", output.display().to_string(), e.to_string()))?;
    info!("Wrote {} bytes to {}", pdf_bytes.len(), output.display());

    Ok(report)
}

fn run(cli: &Cli) -> CalcResult<()> {
    let settings = Settings::load(cli.config.as_deref(), cli.runoff)?;
    debug!(
        "Using {} regions, parameters {:?}",
        settings.regions.len(),
        settings.parameters
    );

    match &cli.command {
        Command::Regions => {
            if cli.json {
                print_json(&settings.regions)?;
            } else {
                print_regions(&settings.regions);
            }
        }
        Command::Size(args) => {
            let output = sizing_output(args, &settings)?;
            if cli.json {
                print_json(&output)?;
            } else {
                print_sizing(&output);
            }
        }
        Command::Report {
            sizing,
            output,
            prepared_by,
            client,
        } => {
            let report = write_report(sizing, &settings, output, prepared_by.as_deref(), client.as_deref())?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("Relatório gravado em {}", output.display());
                println!("Volume do reservatório: {}", report.formatted.tank_volume);
            }
        }
    }

    Ok(())
}

/// Follow-up line printed under an error, for errors the user can fix.
fn error_hint(error: &CalcError) -> Option<&'static str> {
    if error.is_user_correctable() {
        Some("Corrija os dados informados e tente novamente.")
    } else {
        None
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::builder().filter_level(LevelFilter::Info).init();
    } else {
        env_logger::init();
    }

    if let Err(error) = run(&cli) {
        if cli.json {
            if let Ok(json) = serde_json::to_string_pretty(&error) {
                println!("{}", json);
            }
        }
        eprintln!("Erro [{}]: {}", error.error_code(), error);
        if let Some(hint) = error_hint(&error) {
            eprintln!("{}", hint);
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(region: Option<&str>, area: &str, demand: &str) -> SizingArgs {
        SizingArgs {
            region: region.map(str::to_string),
            area: area.to_string(),
            demand: demand.to_string(),
        }
    }

    fn default_settings() -> Settings {
        Settings::load(None, None).unwrap()
    }

    #[test]
    fn test_parse_size_command() {
        let cli = Cli::try_parse_from([
            "cisterna", "size", "--region", "sul", "--area", "100", "--demand", "300", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Size(args) => {
                assert_eq!(args.region.as_deref(), Some("sul"));
                assert_eq!(args.area, "100");
                assert_eq!(args.demand, "300");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_defaults() {
        let cli = Cli::try_parse_from([
            "cisterna", "report", "--region", "sul", "--area", "100", "--demand", "300",
        ])
        .unwrap();

        match cli.command {
            Command::Report { output, prepared_by, .. } => {
                assert_eq!(output, PathBuf::from("relatorio-cisterna.pdf"));
                assert!(prepared_by.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_area_reaches_validation() {
        let cli = Cli::try_parse_from(["cisterna", "size", "--region", "sul", "--area", "-5", "--demand", "300"])
            .unwrap();
        let Command::Size(args) = cli.command else {
            panic!("expected size command");
        };

        let err = size(&args, &default_settings()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_reference_scenario() {
        let output = sizing_output(&args(Some("sul"), "100", "300"), &default_settings()).unwrap();

        assert_eq!(output.result.tank_volume_liters, 6570.0);
        assert_eq!(output.formatted.monthly_savings, "R$ 73,00");
        assert_eq!(output.limiting_factor, LimitingFactor::Demand);
        assert_eq!(output.echo.region_name, "Sul");
    }

    #[test]
    fn test_pt_br_entry_is_accepted() {
        let output = sizing_output(&args(Some("sul"), "100,0", "300"), &default_settings()).unwrap();
        assert_eq!(output.input.catchment_area_m2, 100.0);
    }

    #[test]
    fn test_missing_region_is_invalid_input() {
        let err = sizing_output(&args(None, "100", "300"), &default_settings()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_runoff_flag_reduces_capture() {
        let settings = Settings::load(None, Some(0.85)).unwrap();
        let output = sizing_output(&args(Some("sul"), "100", "300"), &settings).unwrap();

        assert_eq!(output.parameters.runoff_coefficient, 0.85);
        assert!((output.result.monthly_capture_avg_liters - 136_000.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_runoff_flag_rejected() {
        let err = Settings::load(None, Some(1.5)).err().unwrap();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_missing_config_file_is_file_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Settings::load(Some(&path), None).err().unwrap();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_sizing_output_serializes() {
        let output = sizing_output(&args(Some("sul"), "100", "300"), &default_settings()).unwrap();
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["result"]["tank_volume_liters"], 6570.0);
        assert_eq!(json["formatted"]["tank_volume"], "6.570 L");
        assert_eq!(json["limiting_factor"], "Demand");
    }

    #[test]
    fn test_error_hint_only_for_user_correctable_errors() {
        let err = sizing_output(&args(Some("sul"), "0", "300"), &default_settings()).unwrap_err();
        assert!(error_hint(&err).is_some());

        let err = CalcError::file_error("write report", "x.pdf", "permission denied");
        assert!(error_hint(&err).is_none());
    }

    #[test]
    fn test_config_file_drives_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cisterna.toml");
        fs::write(&path, "[[regions]]\nkey = \"serra\"\nname = \"Serra\"\nannual_rainfall_mm = 2000.0\n").unwrap();

        let settings = Settings::load(Some(&path), Some(0.85)).unwrap();
        assert_eq!(settings.regions.len(), 1);
        assert!(settings.regions.get("serra").is_some());
        assert_eq!(settings.parameters.runoff_coefficient, 0.85);
    }

    #[test]
    fn test_write_report_to_missing_directory_is_file_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("nao-existe").join("relatorio.pdf");

        let err = write_report(&args(Some("sul"), "100", "300"), &default_settings(), &output, None, None)
            .unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("relatorio.pdf");

        let report = write_report(
            &args(Some("sul"), "100", "300"),
            &default_settings(),
            &output,
            Some("Ana Souza"),
            Some("Sitio A // lote 3"),
        )
        .unwrap();

        assert_eq!(report.formatted.tank_volume, "6.570 L");
        assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));
    }
}
