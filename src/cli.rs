//! Command-line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Blog post API with client certificate authentication
#[derive(Parser, Debug)]
#[command(name = "blog-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "BLOG_API_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "BLOG_API_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "BLOG_API_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "BLOG_API_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "BLOG_API_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server (default)
    Serve,

    /// Certificate tooling
    #[command(subcommand)]
    Tls(TlsCommand),
}

/// Certificate subcommands
#[derive(Subcommand, Debug)]
pub enum TlsCommand {
    /// Generate a self-signed CA (`ca.crt` / `ca.key`)
    InitCa {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// CA common name
        #[arg(long, default_value = "Blog API Client CA")]
        cn: String,

        /// Validity in days
        #[arg(long, default_value_t = 3650)]
        days: u32,
    },

    /// Issue a leaf certificate signed by a CA
    Issue(IssueArgs),

    /// Run the client certificate check against the configured CA bundle
    Verify {
        /// Leaf certificate (PEM)
        #[arg(required = true)]
        cert: PathBuf,

        /// Intermediate certificates (PEM), presented alongside the leaf
        #[arg(long)]
        chain: Option<PathBuf>,
    },
}

/// Arguments of `tls issue`
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// CA certificate (PEM)
    #[arg(long)]
    pub ca_cert: PathBuf,

    /// CA private key (PEM)
    #[arg(long)]
    pub ca_key: PathBuf,

    /// Common name
    #[arg(long)]
    pub cn: String,

    /// Organizational unit
    #[arg(long)]
    pub ou: Option<String>,

    /// DNS subject alternative names
    #[arg(long = "dns")]
    pub dns: Vec<String>,

    /// URI subject alternative names (e.g. `spiffe://blog/importer`)
    #[arg(long = "uri")]
    pub uri: Vec<String>,

    /// Validity in days
    #[arg(long, default_value_t = 365)]
    pub days: u32,

    /// Issue a server certificate instead of a client certificate
    #[arg(long)]
    pub server: bool,

    /// Output directory
    #[arg(short, long)]
    pub out: PathBuf,

    /// File stem for `<name>.crt` / `<name>.key`
    #[arg(long, default_value = "client")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_server_mode() {
        let cli = Cli::try_parse_from(["blog-api"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn parses_issue_with_repeated_sans() {
        let cli = Cli::try_parse_from([
            "blog-api", "tls", "issue", "--ca-cert", "ca.crt", "--ca-key", "ca.key", "--cn",
            "importer", "--dns", "a.example", "--dns", "b.example", "--uri",
            "spiffe://blog/importer", "--out", "certs",
        ])
        .unwrap();
        let Some(Command::Tls(TlsCommand::Issue(args))) = cli.command else {
            panic!("expected tls issue");
        };
        assert_eq!(args.dns, ["a.example", "b.example"]);
        assert_eq!(args.uri, ["spiffe://blog/importer"]);
        assert_eq!(args.name, "client");
        assert_eq!(args.days, 365);
        assert!(!args.server);
    }

    #[test]
    fn verify_requires_certificate() {
        assert!(Cli::try_parse_from(["blog-api", "tls", "verify"]).is_err());
    }
}
