use askpdf_server::{
    cli::{Cli, Command, run_ask},
    logging,
    server::{ServerConfig, run_server},
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing so `.env` values feed the env fallbacks of the flags.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.log_json)?;

    match cli.command {
        Command::Serve(args) => {
            let config = args.to_config()?;
            let pipeline = config.build_pipeline()?;
            run_server(ServerConfig::from(&config), pipeline).await
        }
        Command::Ask(args) => run_ask(args).await,
    }
}
