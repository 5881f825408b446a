use clap::Parser;
use homesave::api::{Cli, run_cli};
use homesave::logging::init_logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let code = run_cli(cli).await;
    if code != 0 {
        std::process::exit(code);
    }
}
