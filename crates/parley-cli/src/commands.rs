use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use parley_crypto::{SigningKey, VerifyingKey};
use parley_server::{IngressMode, ParleyServer, ServerConfig};
use parley_types::{now_millis, Expiry};

use crate::cli::*;

/// Topic used when `--log-addr` is given without `--topic`.
const DEFAULT_TOPIC: &str = "chat";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Keygen => cmd_keygen(&cli.format),
        Command::Token(args) => cmd_token(args, &cli.format),
        Command::Verify(args) => cmd_verify(args, &cli.format),
    }
}

/// Merge the config file (if any) with command-line overrides.
fn serve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.local_only {
        config.ingress = IngressMode::Local;
    } else if let Some(addr) = args.log_addr {
        let topic = args.topic.clone().unwrap_or_else(|| DEFAULT_TOPIC.into());
        config.ingress = IngressMode::Remote { addr, topic };
    }
    if let Some(dir) = &args.static_dir {
        config.static_dir = Some(dir.clone());
    }
    if let Some(backlog) = args.backlog {
        config.backlog_capacity = backlog;
    }
    if args.allow_remote_exit {
        config.allow_remote_exit = true;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    runtime.block_on(async move {
        let server = ParleyServer::start(config).await?;
        println!(
            "{} Parley on {} (backlog {})",
            "✓".green().bold(),
            server.config().bind_addr.to_string().bold(),
            server.config().backlog_capacity,
        );
        server.serve().await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_keygen(format: &OutputFormat) -> anyhow::Result<()> {
    let key = SigningKey::generate();
    let public = key.verifying_key().to_hex();
    match format {
        OutputFormat::Json => println!("{}", json!({ "secret": key.to_hex(), "public": public })),
        OutputFormat::Text => {
            println!("{} {}", "secret:".yellow(), key.to_hex());
            println!("{} {}", "public:".cyan(), public);
        }
    }
    Ok(())
}

fn cmd_token(args: TokenArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let key = SigningKey::from_hex(args.key.trim()).context("reading --key")?;
    let expiry = Expiry::after(Duration::from_millis(args.ttl_ms));
    let token = parley_crypto::issue(&key, args.user, expiry);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user": args.user, "expires_ms": expiry.as_millis() })
        ),
        OutputFormat::Text => println!("{token}"),
    }
    Ok(())
}

fn cmd_verify(args: VerifyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let key = VerifyingKey::from_hex(args.public_key.trim()).context("reading --public-key")?;
    let user = parley_crypto::verify(&key, now_millis(), &args.token)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "valid": true, "user": user })),
        OutputFormat::Text => println!("{} token valid for {}", "✓".green().bold(), user.to_string().bold()),
    }
    Ok(())
}
