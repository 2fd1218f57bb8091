//! Blog API - blog post JSON API with client certificate authentication

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use rustls::pki_types::CertificateDer;
use tracing::{error, info};

use blog_api::{
    api::ApiServer,
    cli::{Cli, Command, IssueArgs, TlsCommand},
    config::Config,
    mtls::{
        CaParams, CertGenerator, CertificateAuthenticator, LeafCertParams, LeafUsage, PeerData,
        PresentedCertificate, TrustAnchor, VerificationOutcome,
    },
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Some(Command::Tls(ref tls_cmd)) => match run_tls_command(tls_cmd, cli.config.as_deref()) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("❌ {e:#}");
                ExitCode::FAILURE
            }
        },
        Some(Command::Serve) | None => run_server(cli).await,
    }
}

/// Run certificate tooling commands
fn run_tls_command(cmd: &TlsCommand, config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    match cmd {
        TlsCommand::InitCa { out, cn, days } => {
            let ca = CertGenerator::init_ca(&CaParams {
                cn,
                validity_days: *days,
            })?;
            CertGenerator::write_to_dir(&ca, out, "ca")?;
            println!("✅ CA written to {}/ca.crt and ca.key", out.display());
            println!("   Point mtls.ca_cert at ca.crt to trust certificates it issues");
            Ok(ExitCode::SUCCESS)
        }

        TlsCommand::Issue(args) => {
            issue(args)?;
            Ok(ExitCode::SUCCESS)
        }

        TlsCommand::Verify { cert, chain } => {
            let config = Config::load(config_path).context("Failed to load configuration")?;
            let anchor = TrustAnchor::from_pem_file(&config.mtls.ca_cert)?;
            let authenticator = CertificateAuthenticator::new(Arc::new(anchor))
                .with_max_chain_depth(config.mtls.max_chain_depth);

            let mut presented = read_certificates(cert)?;
            if presented.is_empty() {
                bail!("No certificate found in {}", cert.display());
            }
            let leaf = presented.remove(0);
            if let Some(chain) = chain {
                presented.extend(read_certificates(chain)?);
            }

            let peer = PeerData::presented(PresentedCertificate::with_intermediates(leaf, presented));
            match authenticator.authenticate(&peer) {
                VerificationOutcome::Allowed { subject_identity } => {
                    println!("✅ Allowed");
                    println!("{}", serde_json::to_string_pretty(&subject_identity)?);
                    Ok(ExitCode::SUCCESS)
                }
                VerificationOutcome::Denied { reason } => {
                    println!("❌ Denied: {} ({reason})", reason.public_message());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Issue a leaf certificate from an existing CA
fn issue(args: &IssueArgs) -> anyhow::Result<()> {
    let ca_cert = fs::read_to_string(&args.ca_cert)
        .with_context(|| format!("Cannot read CA cert {}", args.ca_cert.display()))?;
    let ca_key = fs::read_to_string(&args.ca_key)
        .with_context(|| format!("Cannot read CA key {}", args.ca_key.display()))?;

    let usage = if args.server {
        LeafUsage::Server
    } else {
        LeafUsage::Client
    };
    let leaf = CertGenerator::issue_leaf(
        &LeafCertParams {
            cn: &args.cn,
            ou: args.ou.as_deref(),
            san_dns: args.dns.clone(),
            san_uris: args.uri.clone(),
            validity_days: args.days,
            usage,
        },
        &ca_cert,
        &ca_key,
    )?;
    CertGenerator::write_to_dir(&leaf, &args.out, &args.name)?;

    println!(
        "✅ {usage:?} certificate for '{}' written to {}/{}.crt",
        args.cn,
        args.out.display(),
        args.name
    );
    Ok(())
}

/// Read certificates from a PEM file, falling back to a single raw DER blob
fn read_certificates(path: &Path) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let certs = rustls_pemfile::certs(&mut bytes.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid PEM in {}", path.display()))?;
    if certs.is_empty() && !bytes.is_empty() {
        return Ok(vec![CertificateDer::from(bytes)]);
    }
    Ok(certs)
}

/// Run the API server
async fn run_server(cli: Cli) -> ExitCode {
    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            // Apply CLI overrides
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host.clone_from(host);
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        mtls = config.mtls.enabled,
        "Starting Blog API"
    );

    let server = match ApiServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!(fatal = e.is_fatal(), "Failed to create server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!(fatal = e.is_fatal(), "Server error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Shutdown complete");
    ExitCode::SUCCESS
}
