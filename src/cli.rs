use clap::{Parser, Subcommand};

/// Folio — notification & activity backend for a portfolio CMS
#[derive(Parser)]
#[command(name = "folio", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind; falls back to FOLIO_PORT, then 8080
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage the activity log
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
}

#[derive(Subcommand)]
pub enum ActivityCommands {
    /// Delete activity records older than the given number of days
    Purge {
        #[arg(long, default_value = "7")]
        older_than_days: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_serve_port_is_optional() {
        let cli = Cli::try_parse_from(["folio", "serve"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, None),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_port_flag_overrides() {
        let cli = Cli::try_parse_from(["folio", "serve", "--port", "9090"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, Some(9090)),
            _ => panic!("expected serve"),
        }
    }
}
