use anyhow::Context;
use clap::{command, Parser};
use log::info;

use kvcache::{history, Cache, CacheConfig, Method, StoredValue};

/// Flush the current redis database, save values into it, read them back and show the call history.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// redis server url
    #[arg(long, default_value = CacheConfig::DEFAULT_URL)]
    url: String,

    /// print the history as json
    #[arg(long)]
    json: bool,

    /// values to save; integers and floats are stored as numbers
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<String>,
}

fn parse_value(raw: &str) -> StoredValue {
    if let Ok(n) = raw.parse::<i64>() {
        StoredValue::Int(n)
    } else if let Ok(x) = raw.parse::<f64>() {
        StoredValue::Float(x)
    } else {
        StoredValue::Str(raw.to_string())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let config = CacheConfig::new(args.url);
    let mut cache =
        Cache::connect(&config).with_context(|| format!("connecting to {}", config.url))?;
    info!("connected to {}", config.url);

    for raw in &args.values {
        let key = cache.save(parse_value(raw))?;
        let stored = cache.retrieve_str(&key)?;
        println!("{} => {}", key, stored);
    }

    if args.json {
        let store = cache.store_mut().context("cache closed")?;
        let history = history::replay(store, Method::Save.qualified_name())?;
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        history::display_call_history(&mut cache, Method::Save)?;
    }
    Ok(())
}
