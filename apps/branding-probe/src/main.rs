//! Branding probe
//!
//! Runs the branding resolution pipeline from the command line, against the
//! lookup channel named in the configuration.
//!
//! ```bash
//! # Which tenant owns a hostname?
//! branding-probe --config branding.yaml domain help.acme.test
//!
//! # Branding a signed-in visitor would see, as CSS
//! branding-probe email owner@acme.test
//!
//! # Effective configuration, credential redacted
//! branding-probe -c branding.yaml check
//! ```

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use branding::domain::color::{Rgb, hex_to_hsl};
use branding::domain::css::BrandingStyles;
use branding::domain::domain_lookup::PageLocation;
use branding::infra::auth::StaticAuthClient;
use branding::infra::css_sink::RootStyleSheet;
use branding::{BrandingConfig, BrandingModule};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Tenant branding resolution probe
#[derive(Parser, Debug)]
#[command(name = "branding-probe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a hostname to its tenant branding
    Domain {
        hostname: String,
        /// Page path, used to pick the theme storage key
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Resolve branding for a signed-in email and print the CSS it produces
    Email { address: String },
    /// Print the theme storage key for a route
    ThemeKey { path: String },
    /// Convert a hex color to the CSS HSL triple
    Hsl { hex: String },
    /// Validate configuration and print it with secrets redacted
    Check,
}

fn init_logging(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let config = BrandingConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Domain { hostname, path } => {
            let module = BrandingModule::from_config(&config)?;
            resolve_domain(&module, &hostname, &path).await
        }
        Commands::Email { address } => {
            let module = BrandingModule::from_config(&config)?;
            resolve_email(&module, address).await
        }
        Commands::ThemeKey { path } => {
            let module = BrandingModule::from_config(&config)?;
            println!("{}", module.theme_storage_key(&path));
            Ok(())
        }
        Commands::Hsl { hex } => {
            if Rgb::parse_hex(&hex).is_err() {
                bail!("not a 3- or 6-digit hex color: {hex:?}");
            }
            println!("{}", hex_to_hsl(&hex));
            Ok(())
        }
        Commands::Check => {
            let rendered = serde_json::to_string_pretty(&config)
                .context("failed to render configuration")?;
            println!("{rendered}");
            tracing::info!("configuration is valid");
            Ok(())
        }
    }
}

async fn resolve_domain(module: &BrandingModule, hostname: &str, path: &str) -> Result<()> {
    let location = PageLocation::new(hostname, path);
    let ctx = module.mount_custom_domain(&location);
    let state = ctx
        .wait_until_resolved()
        .await
        .context("domain resolution was abandoned")?;

    let branding = state.branding.as_ref().map(|b| {
        json!({
            "logo_url": module.logo_for(&b.settings),
            "primary_color": b.settings.primary_color,
            "secondary_color": b.settings.secondary_color,
        })
    });
    let report = json!({
        "phase": state.phase.as_str(),
        "is_custom_domain": state.is_custom_domain,
        "domain": state.domain,
        "user_id": state.user_id,
        "branding": branding,
        "error": state.error,
        "theme_storage_key": module.theme_storage_key(path),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn resolve_email(module: &BrandingModule, address: String) -> Result<()> {
    let auth = Arc::new(StaticAuthClient::signed_in(address));
    let ctx = module.mount_branding(auth);
    let state = ctx
        .wait_until_ready()
        .await
        .context("branding resolution was abandoned")?;
    let settings = state.branding.unwrap_or_else(|| module.defaults().clone());

    println!("logo: {}", module.logo_for(&settings));
    let sheet = Arc::new(RootStyleSheet::default());
    let _styles = BrandingStyles::apply(sheet.clone(), &settings);
    println!("{}", sheet.render());
    Ok(())
}
