// Command line entry point for the kline sync tool.
use std::{fs::File, io, time::Duration};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;

use kline_sync::{
    binance::api_caller::BinanceSource,
    config::Settings,
    constants, export,
    indicators::set::{AnnotatedSeries, IndicatorConfig},
    model,
    source::CandleSource,
    store::{
        self,
        series::{SeriesStore, SqliteStore},
    },
    symbols,
    sync::{self, SyncConfig},
};

// Command-line argument parser.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

// Subcommands for the application.
#[derive(Subcommand, Debug)]
enum Commands {
    // Backfill new symbols and merge recent candles into stored ones.
    Sync {
        /// Read symbols from this file instead of asking the exchange.
        #[arg(long)]
        symbols_file: Option<String>,
        #[arg(long, default_value = constants::DEFAULT_INTERVAL)]
        interval: String,
        #[arg(long, default_value = constants::DEFAULT_QUOTE_SUFFIX)]
        quote_suffix: String,
        /// Pause between two symbols.
        #[arg(long, default_value_t = constants::PACING_MS)]
        pacing_ms: u64,
    },
    // List the symbols that have a stored series.
    Symbols,
    // Compute indicators for a stored symbol and print them as CSV.
    Show {
        symbol: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Only the most recent rows are used.
        #[arg(long, default_value_t = constants::SHOW_TAIL)]
        tail: usize,
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<String>,
    },
}

#[tokio::main]
// Main function entry point.
async fn main() {
    dotenv().ok();

    env_logger::init();

    let args = Args::parse();
    let settings = Settings::from_env();

    let conn = match store::sqlite::init_sqlite_connection(&settings.sqlite_file) {
        Ok(conn) => conn,
        Err(err) => {
            log::error!("Error initializing database connection: {}", err);
            return;
        }
    };
    let mut store = match SqliteStore::new(conn) {
        Ok(store) => store,
        Err(err) => {
            log::error!("Error preparing store: {}", err);
            return;
        }
    };

    match args.command {
        Commands::Sync {
            symbols_file,
            interval,
            quote_suffix,
            pacing_ms,
        } => {
            let config = SyncConfig {
                interval,
                pacing: Duration::from_millis(pacing_ms),
                ..Default::default()
            };
            match run_sync(&settings, &mut store, symbols_file, &quote_suffix, &config).await {
                Ok(report) => log::info!("Sync finished: {}", report),
                Err(err) => log::error!("Error syncing symbols: {}", err),
            }
        }

        Commands::Symbols => match store.list_symbols() {
            Ok(symbols) => {
                for symbol in symbols {
                    println!("{symbol}");
                }
            }
            Err(err) => log::error!("Error listing symbols: {}", err),
        },

        Commands::Show {
            symbol,
            start,
            end,
            tail,
            output,
        } => match show(&store, &symbol.to_uppercase(), start, end, tail, output) {
            Ok(_) => log::info!("Successfully exported {}", symbol),
            Err(err) => log::error!("Error exporting {}: {}", symbol, err),
        },
    }
}

async fn run_sync(
    settings: &Settings,
    store: &mut SqliteStore,
    symbols_file: Option<String>,
    quote_suffix: &str,
    config: &SyncConfig,
) -> model::Result<sync::SyncReport> {
    let source = BinanceSource::new(&settings.binance_base_url, settings.binance_api_key.clone())?;

    let symbols = match symbols_file {
        Some(path) => symbols::read_symbols_from_file(&path)?,
        None => source.list_tradable_symbols(quote_suffix).await?,
    };
    log::info!("Syncing {} symbols", symbols.len());

    sync::sync_symbols(&source, store, &symbols, config, Utc::now()).await
}

fn show(
    store: &SqliteStore,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    tail: usize,
    output: Option<String>,
) -> model::Result<()> {
    let series = store.load(symbol)?.tail(tail);
    let annotated = AnnotatedSeries::new(series, IndicatorConfig::default());
    let rows = annotated.rows_between(start, end);

    match output {
        Some(path) => export::write_csv(&annotated, rows, File::create(path)?),
        None => export::write_csv(&annotated, rows, io::stdout().lock()),
    }
}
