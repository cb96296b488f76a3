use clap::{Parser, Subcommand};
use metrics_exporter_statsd::StatsdBuilder;
use std::process;
use tracing_subscriber::EnvFilter;
use webhook_router::Config;

#[derive(Parser)]
#[command(name = "firewatch", about = "Webhook-driven project provisioning service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API and admin listeners
    Serve,
    /// Validate the environment configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            process::exit(1);
        }
    };

    match cli.command {
        Command::CheckConfig => {
            println!("configuration ok");
        }
        Command::Serve => {
            if let Some(statsd) = &config.statsd {
                match StatsdBuilder::from(statsd.host.as_str(), statsd.port)
                    .build(Some("firewatch"))
                {
                    Ok(recorder) => {
                        if let Err(e) = metrics::set_global_recorder(recorder) {
                            tracing::warn!(error = %e, "metrics recorder already set");
                        }
                    }
                    Err(e) => {
                        eprintln!("statsd exporter error: {e}");
                        process::exit(1);
                    }
                }
            }

            tracing::info!("starting firewatch");
            if let Err(e) = webhook_router::run(config).await {
                eprintln!("Service error: {e}");
                process::exit(1);
            }
        }
    }
}
