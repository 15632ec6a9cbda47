//! Roast Log - command-line host
//!
//! Lists and manages the roasts saved in the configured data directory.

use clap::{Parser, Subcommand};
use roastlog_core::{default_presets, display_percent, display_time, RoastingRecord};
use roastlog_recorder::{config::Config, telemetry, BeanListStore, JsonFileStore, RecordRepository};

#[derive(Parser)]
#[command(name = "roastlog")]
#[command(about = "Coffee roast log", long_about = None)]
struct Cli {
    /// Data directory (overrides storage.data_dir)
    #[arg(long, global = true, env = "ROASTLOG_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved roasts, newest first
    List,
    /// Print one roast as JSON
    Show { id: String },
    /// Delete a saved roast
    Delete { id: String },
    /// Show the bean list
    Beans,
    /// Add a custom bean to the list
    AddBean { name: String },
    /// Show the built-in roaster presets
    Presets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load()?;
    telemetry::init(&config.logging);

    tracing::debug!("Environment: {}", config.environment);

    let data_dir = cli.data_dir.unwrap_or(config.storage.data_dir);
    let store = JsonFileStore::new(data_dir);

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => {
            let records = RecordRepository::list(&store).await?;
            if records.is_empty() {
                println!("No roasts saved yet.");
            }
            for record in &records {
                println!("{}", summary_line(record));
            }
        }
        Commands::Show { id } => match RecordRepository::get(&store, &id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => anyhow::bail!("record {} not found", id),
        },
        Commands::Delete { id } => {
            if !RecordRepository::delete(&store, &id).await? {
                anyhow::bail!("record {} not found", id);
            }
            tracing::info!("Deleted record {}", id);
        }
        Commands::Beans => {
            for bean in BeanListStore::load(&store).await? {
                println!("{}", bean);
            }
        }
        Commands::AddBean { name } => {
            let mut beans = BeanListStore::load(&store).await?;
            match roastlog_core::add_bean(&mut beans, &name) {
                Some(added) => {
                    BeanListStore::save(&store, &beans).await?;
                    println!("{}", added);
                }
                None => anyhow::bail!("bean name is empty"),
            }
        }
        Commands::Presets => {
            for preset in default_presets() {
                let s = preset.settings;
                println!(
                    "{}: FAN1 {} / heater {} / FAN2 {}",
                    preset.name,
                    s.fan1.map(|v| v.to_string()).unwrap_or_default(),
                    s.heater.map(|v| v.to_string()).unwrap_or_default(),
                    s.fan2.map(|v| v.to_string()).unwrap_or_default(),
                );
            }
        }
    }

    Ok(())
}

fn summary_line(record: &RoastingRecord) -> String {
    let time = record
        .time
        .map(|t| t.format(" %H:%M").to_string())
        .unwrap_or_default();
    format!(
        "{}{}  {:<24} {}g  total {}  maillard {}  develop {}  DTR {}  yield {}  [{}]",
        record.date,
        time,
        record.bean_name,
        record.green_weight,
        record.total_time,
        display_time(record.maillard_time),
        display_time(record.develop_time),
        display_percent(record.dtr),
        display_percent(record.yield_percent),
        record.id,
    )
}
