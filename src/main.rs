use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use procsnap::ProcessSnapshot;
use procsnap::config::{self, load_config, load_config_from_path};

#[derive(Parser)]
#[command(
    name = "procsnap",
    about = "Print resource and host-identity snapshots of the current process as JSON"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay between samples in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Number of records to emit (0 = run until interrupted)
    #[arg(long)]
    count: Option<u64>,

    /// Pretty-print each JSON record
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    #[cfg(feature = "perf-tracing")]
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    let mut snapshot = ProcessSnapshot::new()?;
    let interval = Duration::from_millis(config.general.interval_ms);
    let mut emitted = 0u64;

    loop {
        snapshot.sample();
        let record = snapshot.record();
        let line = if config.output.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        println!("{line}");

        emitted += 1;
        if config.general.count != 0 && emitted >= config.general.count {
            break;
        }
        tokio::time::sleep(interval).await;
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval_ms) = cli.interval_ms {
        config.general.interval_ms = interval_ms;
    }
    if let Some(count) = cli.count {
        config.general.count = count;
    }
    if cli.pretty {
        config.output.pretty = true;
    }

    config
}
