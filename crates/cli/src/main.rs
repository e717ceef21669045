use api_shared::{AddLetterReq, Envelope};
use clap::{Parser, Subcommand};
use registry_core::{LetterRegistry, RegistryConfig, SchemaOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "letters")]
#[command(about = "Clinic letter registry CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a letter and print its number
    Add {
        /// Letter type code, e.g. SKS
        letter_type: String,
        /// Patient name
        patient_name: String,
        /// Letter date (YYYY-MM-DD)
        letter_date: String,
        /// Detail payload as a JSON object
        #[arg(long, default_value = "{}")]
        detail: String,
    },
    /// List issued letters, most recent first
    History {
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or migrate the sheet to the current column layout
    Reconcile,
    /// Show the column layout and letter types
    Catalog,
    /// Run a raw action request, e.g. '{"action":"get"}'
    Exec {
        /// Request JSON
        request: String,
    },
}

fn config_from_env() -> anyhow::Result<RegistryConfig> {
    Ok(RegistryConfig::from_env_values(
        std::env::var("REGISTRY_DATA_DIR").ok(),
        std::env::var("REGISTRY_SHEET_NAME").ok(),
        std::env::var("CLINIC_CODE").ok(),
        std::env::var("REGISTRY_DATE_LOCALE").ok(),
    )?)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config_from_env()?;
    let registry = LetterRegistry::open(&cfg)?;

    match cli.command {
        Commands::Add {
            letter_type,
            patient_name,
            letter_date,
            detail,
        } => {
            let req = AddLetterReq {
                letter_type,
                patient_name,
                letter_date,
                detail_data: detail,
            };
            let res = api_rest::actions::register(&registry, req)?;
            println!("{}: {}", res.message, res.letter_number);
        }
        Commands::History { json } => {
            let entries = api_rest::actions::history(&registry)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No letters found.");
            } else {
                for entry in entries {
                    println!(
                        "{:>4}  {}  {}  {}  {}",
                        entry.id,
                        entry.letter_number,
                        entry.letter_type_text,
                        entry.patient_name,
                        entry.letter_date_formatted
                    );
                }
            }
        }
        Commands::Reconcile => match registry.reconcile()? {
            SchemaOutcome::Created => println!("Created sheet at {}", cfg.sheet().path().display()),
            SchemaOutcome::Unchanged => println!("Sheet already matches the catalog."),
            SchemaOutcome::Migrated(report) => {
                println!("Migrated {} rows.", report.rows);
                if !report.dropped_columns.is_empty() {
                    println!("Dropped columns: {}", report.dropped_columns.join(", "));
                }
                if !report.added_columns.is_empty() {
                    println!("Added columns: {}", report.added_columns.join(", "));
                }
            }
        },
        Commands::Catalog => {
            let res = api_rest::actions::catalog_res(registry.catalog());
            println!("Columns:");
            for (position, column) in res.columns.iter().enumerate() {
                println!("  {position:>2}  {column}");
            }
            println!("Letter types:");
            for letter_type in res.letter_types {
                println!("  {:<5} {}", letter_type.code, letter_type.label);
            }
        }
        Commands::Exec { request } => {
            let envelope = api_rest::actions::dispatch_json(&registry, request.as_bytes());
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            if let Envelope::Error { .. } = envelope {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
