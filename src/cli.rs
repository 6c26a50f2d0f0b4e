use crate::config::{LoggingSettings, Settings};
use crate::error::AppError;
use crate::models::{split_skill_list, FindMatchesRequest};
use crate::server;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "seba-match",
    about = "Rank caregivers for eldercare bookings",
    version
)]
struct Cli {
    /// Load settings from this file instead of config/default.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank caregivers for one request and print the result as JSON
    Match(MatchArgs),
    /// Print caregiver pool statistics as JSON
    Stats(StatsArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct MatchArgs {
    /// Senior whose profile supplies location, gender, area and conditions
    #[arg(long = "senior_id")]
    senior_id: Option<String>,
    #[arg(long = "senior_lat", allow_negative_numbers = true)]
    senior_lat: Option<f64>,
    #[arg(long = "senior_lon", allow_negative_numbers = true)]
    senior_lon: Option<f64>,
    /// Comma-separated list of required services
    #[arg(long = "required_skills")]
    required_skills: Option<String>,
    #[arg(long = "senior_gender")]
    senior_gender: Option<String>,
    #[arg(long = "senior_area")]
    senior_area: Option<String>,
    /// Booking date (YYYY-MM-DD)
    #[arg(long = "booking_date")]
    booking_date: Option<String>,
    /// Booking start time (HH:MM:SS)
    #[arg(long = "start_time")]
    start_time: Option<String>,
    /// Booking length in hours
    #[arg(long = "duration_hrs")]
    duration_hrs: Option<f64>,
    /// Number of matches to return
    #[arg(long = "top_n")]
    top_n: Option<usize>,
    /// Read mock JSON data from this directory
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug, Default)]
struct StatsArgs {
    /// Read mock JSON data from this directory
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl From<MatchArgs> for FindMatchesRequest {
    fn from(args: MatchArgs) -> Self {
        FindMatchesRequest {
            senior_id: args.senior_id,
            senior_lat: args.senior_lat,
            senior_lon: args.senior_lon,
            required_skills: args
                .required_skills
                .as_deref()
                .map(split_skill_list)
                .unwrap_or_default(),
            senior_gender: args.senior_gender,
            senior_area: args.senior_area,
            booking_date: args.booking_date,
            start_time: args.start_time,
            duration_hrs: args.duration_hrs,
            top_n: args.top_n,
        }
    }
}

/// Failure body printed on stdout by the one-shot commands
#[derive(Debug, Serialize)]
struct FailureOutput {
    success: bool,
    error: String,
}

/// Subcommand names; anything else in first position is a flag
const COMMANDS: [&str; 3] = ["serve", "match", "stats"];

/// Rewrite the flag-only invocation used by existing callers
///
/// `--stats` becomes the `stats` command and `--json` with request flags
/// becomes `match`. Output is JSON either way, so `--json` itself is dropped.
fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let has_command = args
        .iter()
        .skip(1)
        .any(|arg| COMMANDS.iter().any(|command| arg == command));
    if has_command {
        return args;
    }

    let stats = args.iter().any(|arg| arg == "--stats");
    let json = args.iter().any(|arg| arg == "--json");
    if !stats && !json {
        return args;
    }

    args.retain(|arg| arg != "--stats" && arg != "--json");
    let command = if stats { "stats" } else { "match" };
    args.insert(1.min(args.len()), OsString::from(command));
    args
}

pub async fn run() -> Result<(), AppError> {
    let cli = Cli::parse_from(normalize_legacy_args(std::env::args_os()));

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    settings.validate()?;
    init_tracing(&settings.logging);

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(settings, args.host, args.port).await,
        Command::Match(args) => run_match(&settings, args).await,
        Command::Stats(args) => run_stats(&settings, args).await,
    }
}

async fn run_match(settings: &Settings, mut args: MatchArgs) -> Result<(), AppError> {
    let pretty = args.pretty;
    let data_dir = args.data_dir.take();

    let result = async {
        let service = server::build_service(settings, data_dir)?;
        let response = service.find_matches(&FindMatchesRequest::from(args)).await?;
        Ok::<_, AppError>(response)
    }
    .await;

    match result {
        Ok(response) => print_json(&response, pretty),
        Err(e) => fail(e, pretty),
    }
}

async fn run_stats(settings: &Settings, args: StatsArgs) -> Result<(), AppError> {
    let result = async {
        let service = server::build_service(settings, args.data_dir)?;
        Ok::<_, AppError>(service.stats().await?)
    }
    .await;

    match result {
        Ok(response) => print_json(&response, args.pretty),
        Err(e) => fail(e, args.pretty),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), AppError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

/// Print the failure body, then hand the error back for a non-zero exit
fn fail(error: AppError, pretty: bool) -> Result<(), AppError> {
    print_json(
        &FailureOutput {
            success: false,
            error: error.to_string(),
        },
        pretty,
    )?;
    Err(error)
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    let installed = if logging.format == "pretty" {
        subscriber.pretty().try_init()
    } else {
        subscriber.compact().try_init()
    };

    if let Err(e) = installed {
        eprintln!("Logging already initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["seba-match"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_match_flags_use_underscores() {
        let cli = Cli::try_parse_from([
            "seba-match",
            "match",
            "--senior_lat",
            "23.7639",
            "--senior_lon",
            "90.3709",
            "--required_skills",
            "Diabetes Care, Companionship",
            "--booking_date",
            "2025-11-22",
            "--start_time",
            "14:00:00",
            "--top_n",
            "3",
            "--data-dir",
            "data/mock",
        ])
        .unwrap();

        let Some(Command::Match(args)) = cli.command else {
            panic!("expected match command");
        };
        assert_eq!(args.data_dir, Some(PathBuf::from("data/mock")));

        let request = FindMatchesRequest::from(args);
        assert_eq!(request.senior_lat, Some(23.7639));
        assert_eq!(request.required_skills, vec!["Diabetes Care", "Companionship"]);
        assert_eq!(request.top_n, Some(3));
        assert!(request.duration_hrs.is_none());
    }

    #[test]
    fn test_stats_command() {
        let cli = Cli::try_parse_from(["seba-match", "stats", "--pretty"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Stats(StatsArgs { pretty: true, .. }))));
    }

    #[test]
    fn test_failure_output_shape() {
        let body = serde_json::to_value(FailureOutput {
            success: false,
            error: "Senior not found: s-9".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "error": "Senior not found: s-9"}));
    }

    #[test]
    fn test_legacy_stats_flag() {
        let args = normalize_legacy_args(["seba-match", "--stats", "--json"]);
        assert_eq!(args, vec![OsString::from("seba-match"), OsString::from("stats")]);

        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Some(Command::Stats(_))));
    }

    #[test]
    fn test_legacy_json_flag_runs_match() {
        let args = normalize_legacy_args([
            "seba-match",
            "--json",
            "--senior_id",
            "senior-001",
            "--booking_date",
            "2025-11-22",
            "--start_time",
            "14:00:00",
            "--top_n",
            "3",
        ]);
        let cli = Cli::try_parse_from(args).unwrap();

        let Some(Command::Match(args)) = cli.command else {
            panic!("expected match command");
        };
        assert_eq!(args.senior_id.as_deref(), Some("senior-001"));
        assert_eq!(args.top_n, Some(3));
    }

    #[test]
    fn test_subcommand_args_left_alone() {
        let original = vec![OsString::from("seba-match"), OsString::from("match"), OsString::from("--pretty")];
        assert_eq!(normalize_legacy_args(original.clone()), original);
        assert_eq!(normalize_legacy_args(["seba-match"]), vec![OsString::from("seba-match")]);
    }
}
