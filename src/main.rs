use clap::Parser;

use retirement::api::{Cli, run};
use retirement::logging::init_logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
