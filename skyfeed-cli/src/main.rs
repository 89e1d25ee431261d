//! SKYFEED CLI: run one NASA open data query and print the result.
//!
//! Configuration comes from `--config <file>` (TOML) or, failing that, from
//! the environment after loading a `.env` file.
//!
//! Exit codes: 0 on success, 1 when the query yields no result, 2 on
//! configuration errors.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use skyfeed_client::SkyfeedConnection;
use skyfeed_core::{
    ApodQuery, ClientConfig, ConfigError, ExoplanetFormat, ExoplanetQuery, FailureKind,
    NeoFeedQuery, QueryOutput, Rover, RoverPhotosQuery, SpaceWeatherKind, SpaceWeatherQuery,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

mod exit_codes;
mod output;
mod telemetry;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "skyfeed")]
#[command(about = "Query NASA open data APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "SKYFEED_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (human, json)
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Cache lifetime for this query, in seconds
    #[arg(long, global = true)]
    ttl_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Astronomy picture of the day
    Apod {
        /// Date as YYYY-MM-DD, or "latest"
        #[arg(default_value = "latest")]
        date: String,
        /// Request a thumbnail URL for video entries
        #[arg(long, default_value_t = false)]
        thumbs: bool,
    },
    /// Mars rover photos for one sol
    Rover {
        /// Curiosity, Opportunity or Spirit
        rover: Rover,
        /// Martian sol (non-negative integer)
        sol: String,
        /// Camera abbreviation, e.g. FHAZ
        #[arg(long)]
        camera: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Near-earth objects approaching between two dates
    Neo {
        /// Start date, YYYY-MM-DD
        start: String,
        /// End date, YYYY-MM-DD (at most 7 days after start)
        end: String,
    },
    /// Space weather events (DONKI)
    Donki {
        /// CME, GST, FLR, SEP, MPC, RBE, HSS or notifications
        kind: SpaceWeatherKind,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Exoplanet archive table query
    Exoplanet {
        /// Archive table, e.g. cumulative
        table: String,
        /// Filter clause
        #[arg(long = "where")]
        where_clause: Option<String>,
        /// Columns to return
        #[arg(long)]
        select: Option<String>,
        /// Sort column
        #[arg(long)]
        order: Option<String>,
        #[arg(long, default_value = "csv")]
        format: ExoplanetFormat,
    },
}

impl Commands {
    fn label(&self) -> &'static str {
        match self {
            Commands::Apod { .. } => "picture of the day",
            Commands::Rover { .. } => "rover photos",
            Commands::Neo { .. } => "near-earth objects",
            Commands::Donki { .. } => "space weather events",
            Commands::Exoplanet { .. } => "exoplanet data",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    telemetry::init_tracing();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(exit_codes::CONFIG_ERROR);
        }
    };

    let conn = match SkyfeedConnection::connect(config) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(exit_codes::CONFIG_ERROR);
        }
    };

    let ttl = cli.ttl_secs.map(Duration::from_secs);
    let label = cli.command.label();
    tracing::debug!(command = label, output = ?cli.output, "Running query");
    let result = match run(&conn, cli.command, ttl).await {
        Ok(result) => result,
        Err(message) => {
            eprintln!("Failed to fetch {}: {}", label, message);
            return ExitCode::from(exit_codes::NO_RESULT);
        }
    };

    let Some(result) = result else {
        eprintln!("Failed to fetch {}", label);
        return ExitCode::from(exit_codes::NO_RESULT);
    };

    match output::render(cli.output, &result) {
        Ok(text) => {
            println!("{}", text.trim_end());
            ExitCode::from(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("Failed to render {}: {}", label, e);
            ExitCode::from(exit_codes::NO_RESULT)
        }
    }
}

/// Config file if given, otherwise the environment. Always validated.
fn load_config(path: Option<&std::path::Path>) -> Result<ClientConfig, ConfigError> {
    let config = match path {
        Some(path) => ClientConfig::from_path(path)?,
        None => ClientConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

/// Run one query. `Err` carries a message for arguments rejected locally.
async fn run(
    conn: &SkyfeedConnection,
    command: Commands,
    ttl: Option<Duration>,
) -> Result<Option<QueryOutput>, String> {
    let output = match command {
        Commands::Apod { date, thumbs } => {
            let mut query = ApodQuery::new(&date).with_thumbs(thumbs);
            query.ttl = ttl;
            conn.apod(&query).await.map(QueryOutput::Table)
        }
        Commands::Rover {
            rover,
            sol,
            camera,
            page,
        } => {
            let mut query =
                RoverPhotosQuery::from_sol_str(rover, &sol).map_err(|e| e.to_string())?;
            query.camera = camera;
            query.page = page;
            query.ttl = ttl;
            conn.rover_photos(&query).await.map(QueryOutput::Table)
        }
        Commands::Neo { start, end } => {
            let mut query = NeoFeedQuery::new(start, end);
            query.ttl = ttl;
            conn.neo_feed(&query).await.map(QueryOutput::Table)
        }
        Commands::Donki { kind, start, end } => {
            let query = SpaceWeatherQuery {
                kind,
                start_date: start,
                end_date: end,
                ttl,
            };
            conn.space_weather(&query).await
        }
        Commands::Exoplanet {
            table,
            where_clause,
            select,
            order,
            format,
        } => {
            let query = ExoplanetQuery {
                table,
                where_clause,
                select,
                order,
                format,
                ttl,
            };
            match conn.try_exoplanet(&query).await {
                Ok(table) => Some(QueryOutput::Table(table)),
                Err(e) if e.kind() == FailureKind::Validation => return Err(e.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "Exoplanet query failed");
                    None
                }
            }
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apod_defaults_to_latest() {
        let cli = Cli::try_parse_from(["skyfeed", "apod"]).unwrap();
        match cli.command {
            Commands::Apod { date, thumbs } => {
                assert_eq!(date, "latest");
                assert!(!thumbs);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.output, OutputFormat::Human);
    }

    #[test]
    fn test_parse_rover_case_insensitive() {
        let cli = Cli::try_parse_from([
            "skyfeed", "rover", "curiosity", "1000", "--camera", "FHAZ", "--output", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Rover { rover, sol, camera, .. } => {
                assert_eq!(rover, Rover::Curiosity);
                assert_eq!(sol, "1000");
                assert_eq!(camera.as_deref(), Some("FHAZ"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_parse_unknown_rover_rejected() {
        assert!(Cli::try_parse_from(["skyfeed", "rover", "sojourner", "1"]).is_err());
    }

    #[test]
    fn test_parse_exoplanet() {
        let cli = Cli::try_parse_from([
            "skyfeed",
            "exoplanet",
            "cumulative",
            "--where",
            "koi_prad < 2",
            "--order",
            "kepid",
            "--ttl-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.ttl_secs, Some(60));
        match cli.command {
            Commands::Exoplanet {
                table,
                where_clause,
                format,
                ..
            } => {
                assert_eq!(table, "cumulative");
                assert_eq!(where_clause.as_deref(), Some("koi_prad < 2"));
                assert_eq!(format, ExoplanetFormat::Csv);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_donki_kind() {
        let cli = Cli::try_parse_from(["skyfeed", "donki", "FLR", "--start", "2024-01-01"]).unwrap();
        match cli.command {
            Commands::Donki { kind, start, end } => {
                assert_eq!(kind, SpaceWeatherKind::Flr);
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert!(end.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"file-key\"\nrequest_timeout_ms = 1000").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.request_timeout_ms, 1000);
    }

    #[test]
    fn test_load_config_invalid_file_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"k\"\nrequest_timeout_ms = 0").unwrap();

        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_reports_unsupported_exoplanet_format() {
        let transport =
            std::sync::Arc::new(skyfeed_test_utils::ScriptedTransport::ok("a,b\n1,2\n"));
        let conn = SkyfeedConnection::with_parts(
            ClientConfig::new("k"),
            transport.clone(),
            std::sync::Arc::new(skyfeed_test_utils::ManualClock::fixed()),
        );
        let command = Commands::Exoplanet {
            table: "cumulative".to_string(),
            where_clause: None,
            select: None,
            order: None,
            format: ExoplanetFormat::Votable,
        };

        let err = run(&conn, command, None).await.unwrap_err();
        assert!(err.contains("votable"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_run_exoplanet_empty_body_is_no_result() {
        let transport = std::sync::Arc::new(skyfeed_test_utils::ScriptedTransport::ok(""));
        let conn = SkyfeedConnection::with_parts(
            ClientConfig::new("k"),
            transport.clone(),
            std::sync::Arc::new(skyfeed_test_utils::ManualClock::fixed()),
        );
        let command = Commands::Exoplanet {
            table: "cumulative".to_string(),
            where_clause: None,
            select: None,
            order: None,
            format: ExoplanetFormat::Csv,
        };

        assert_eq!(run(&conn, command, None).await, Ok(None));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_run_rejects_bad_sol_before_request() {
        let transport = std::sync::Arc::new(skyfeed_test_utils::ScriptedTransport::ok("{}"));
        let conn = SkyfeedConnection::with_parts(
            ClientConfig::new("k"),
            transport.clone(),
            std::sync::Arc::new(skyfeed_test_utils::ManualClock::fixed()),
        );
        let command = Commands::Rover {
            rover: Rover::Spirit,
            sol: "-3".to_string(),
            camera: None,
            page: None,
        };

        let err = run(&conn, command, None).await.unwrap_err();
        assert!(err.contains("sol"));
        assert_eq!(transport.request_count(), 0);
    }
}
