use crate::catalog::{run_catalog, CatalogArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use corecrew::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "corecrew",
    about = "Run the CoreCrew Logistics careers site or inspect its hiring catalog",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List open positions, or print the interview questions for one position
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog(args) => {
            run_catalog(args);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["corecrew"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn catalog_accepts_position_filter() {
        let cli = Cli::try_parse_from(["corecrew", "catalog", "--position", "Drivers"])
            .expect("parses");
        match cli.command {
            Some(Command::Catalog(args)) => assert_eq!(args.position.as_deref(), Some("Drivers")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["corecrew", "serve", "--port", "8080"]).expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(8080)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
