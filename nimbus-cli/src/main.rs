use clap::{Parser, Subcommand, ValueEnum};
use nimbus_core::{DiagnosisService, ModelBundle, ModelError, SymptomTable};
use nimbus_http::runtime::{
    ConfigError, DiagnosisRuntime, HttpRuntimeConfig, HttpRuntimeConfigBuilder, load_model,
};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "nimbus", version)]
#[command(about = "NimbusVita diagnosis service - symptom-based condition ranking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Interface to bind (overrides NIMBUS_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides NIMBUS_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Model artifact path (overrides NIMBUS_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,
        /// Log output format
        #[arg(long, value_enum, default_value_t = LogFormat::Json)]
        log_format: LogFormat,
    },
    /// Print a summary of a model artifact as JSON
    Inspect {
        /// Model artifact path
        #[arg(long)]
        model: PathBuf,
    },
    /// Print the symptom table and its aliases as JSON
    Symptoms,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load model: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() {
    let cli = Cli::parse();

    let log_format = match &cli.command {
        Commands::Serve { log_format, .. } => *log_format,
        _ => LogFormat::Json,
    };
    init_logging(log_format);

    if let Err(e) = run(cli.command) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve {
            host,
            port,
            model,
            no_cors,
            log_format: _,
        } => {
            let config = serve_config(host, port, model, no_cors)?;
            serve(config)
        }
        Commands::Inspect { model } => {
            let bundle = ModelBundle::load(&model)?;
            println!("{}", serde_json::to_string_pretty(&bundle.summary())?);
            Ok(())
        }
        Commands::Symptoms => {
            let table = SymptomTable::standard();
            println!(
                "{}",
                serde_json::to_string_pretty(&symptom_catalogue(&table))?
            );
            Ok(())
        }
    }
}

/// Identifiers in feature order, plus the slots reachable under several names.
#[derive(Serialize)]
struct SymptomCatalogue<'a> {
    total: usize,
    symptoms: &'a SymptomTable,
    aliases: BTreeMap<usize, Vec<&'static str>>,
}

fn symptom_catalogue(table: &SymptomTable) -> SymptomCatalogue<'_> {
    SymptomCatalogue {
        total: table.len(),
        symptoms: table,
        aliases: table.aliases(),
    }
}

/// Environment settings with command-line flags applied on top.
fn serve_config(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
    no_cors: bool,
) -> Result<HttpRuntimeConfig, ConfigError> {
    let mut builder = HttpRuntimeConfigBuilder::from_env()?;
    if let Some(host) = host {
        builder = builder.host(host);
    }
    if let Some(port) = port {
        builder = builder.port(port);
    }
    if let Some(model) = model {
        builder = builder.model_path(model);
    }
    if no_cors {
        builder = builder.enable_cors(false);
    }
    builder.build()
}

fn serve(config: HttpRuntimeConfig) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let service = DiagnosisService::new(load_model(&config.model_path));
        DiagnosisRuntime::new(service).serve(config).await
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "nimbus",
            "serve",
            "--port",
            "9000",
            "--model",
            "artifacts/model.json",
            "--no-cors",
            "--log-format",
            "pretty",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve {
                host,
                port,
                model,
                no_cors,
                log_format,
            } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
                assert_eq!(model, Some(PathBuf::from("artifacts/model.json")));
                assert!(no_cors);
                assert_eq!(log_format, LogFormat::Pretty);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_inspect_requires_model() {
        assert!(Cli::try_parse_from(["nimbus", "inspect"]).is_err());
    }

    #[test]
    fn test_symptom_catalogue_lists_aliases() {
        let table = SymptomTable::standard();
        let json = serde_json::to_string(&symptom_catalogue(&table)).unwrap();
        assert!(json.starts_with(r#"{"total":45,"symptoms":{"nausea":5,"joint_pain":6,"#));
        assert!(json.ends_with(r#""aliases":{"12":["pain_behind_the_eyes","pain_behind_eyes"]}}"#));
    }

    #[test]
    fn test_inspect_reports_missing_file() {
        let err = run(Commands::Inspect {
            model: PathBuf::from("does/not/exist.json"),
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Model(ref e) if e.is_not_found()));
    }
}
