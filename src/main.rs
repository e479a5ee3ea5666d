mod commands;
mod config;
mod core;
mod data;
mod logging;
mod model;
mod store;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "divergence",
    about = "A terminal divergence meter and branching worldline timeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create .divergence/ with seed data and a default config
    Init,
    /// Open the interactive meter and timeline
    View {
        /// Launch with built-in sample data (no store required)
        #[arg(long, conflicts_with = "api")]
        demo: bool,
        /// Read from a REST API at this base URL instead of the configured source
        #[arg(long, value_name = "URL")]
        api: Option<String>,
    },
    /// Print worldlines and events
    List {
        /// Only list events in this scope (a worldline id or `crossAttractor`)
        #[arg(long)]
        scope: Option<String>,
    },
    /// Health-check the data source and summarise its contents
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Ok(root) = store::find_root() {
        let settings = commands::load_settings(Some(&root)).unwrap_or_default();
        logging::init(&store::log_path(&root), &settings.log.level)?;
    }

    match cli.command {
        Command::Init => commands::init::run(),
        Command::View { demo, api } => commands::view::run(demo, api),
        Command::List { scope } => commands::list::run(scope),
        Command::Status => commands::status::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn view_rejects_demo_with_api() {
        let parsed = Cli::try_parse_from(["divergence", "view", "--demo", "--api", "http://x"]);
        let err = parsed.err().expect("expected clap parse error");
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn view_accepts_api_url() {
        let cli = Cli::try_parse_from(["divergence", "view", "--api", "http://localhost:3001/api"])
            .expect("api flag should parse");
        match cli.command {
            Command::View { demo, api } => {
                assert!(!demo);
                assert_eq!(api.as_deref(), Some("http://localhost:3001/api"));
            }
            _ => panic!("expected view command"),
        }
    }

    #[test]
    fn list_takes_an_optional_scope() {
        let cli = Cli::try_parse_from(["divergence", "list", "--scope", "beta"]).unwrap();
        match cli.command {
            Command::List { scope } => assert_eq!(scope.as_deref(), Some("beta")),
            _ => panic!("expected list command"),
        }
    }
}
