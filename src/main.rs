use clap::Parser;

use dividend_roadmap::cli::{Cli, Command, run_project};
use dividend_roadmap::config::AppConfig;
use dividend_roadmap::{api, telemetry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Serve(args) => {
            let config = match args.port {
                Some(port) => config.with_port(port),
                None => config,
            };
            telemetry::init_tracing(config.log_json || args.log_json);
            if let Err(e) = api::run_http_server(config).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project(args) => match run_project(&args, &config) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
