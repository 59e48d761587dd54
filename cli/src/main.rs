//! Pixcode CLI - Pix copy-and-paste codes from the terminal.

mod commands;
mod ui;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pixcode_core::qr::QrColor;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixcode")]
#[command(about = "Generate and check Pix copy-and-paste codes", long_about = None)]
struct Cli {
    #[command(flatten)]
    merchant: MerchantArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where the merchant profile comes from, plus per-field overrides
#[derive(Args, Debug, Default)]
pub struct MerchantArgs {
    /// Merchant profile JSON (defaults to ~/.pixcode/profile.json when present)
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Pix key to receive the payment
    #[arg(long, global = true)]
    key: Option<String>,

    /// Merchant name
    #[arg(long, global = true)]
    name: Option<String>,

    /// Merchant city
    #[arg(long, global = true)]
    city: Option<String>,

    /// Description shown by the payer's bank app
    #[arg(long, global = true)]
    description: Option<String>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Amount in BRL, e.g. 15.90 or 15,90
    #[arg(short, long, value_parser = parse_amount)]
    amount: Decimal,

    /// Order id; defaults to ORD followed by the current UTC timestamp
    #[arg(short, long)]
    order: Option<String>,

    /// Write the QR code as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Write the QR code as SVG
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Copy the payload to the clipboard
    #[arg(long)]
    copy: bool,

    /// Don't draw the QR code in the terminal
    #[arg(long)]
    no_qr: bool,

    /// Pixels per QR module in image output
    #[arg(long)]
    module_size: Option<u32>,

    /// Quiet zone in modules for image output
    #[arg(long)]
    margin: Option<u32>,

    /// Dark module color (#RRGGBB or #RRGGBBAA)
    #[arg(long)]
    fg: Option<QrColor>,

    /// Light module color (#RRGGBB or #RRGGBBAA)
    #[arg(long)]
    bg: Option<QrColor>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a Pix code for an amount
    Generate(GenerateArgs),
    /// Verify a Pix code and show its fields (reads the clipboard if omitted)
    Decode {
        payload: Option<String>,
    },
    /// Show the effective merchant profile
    Profile {
        /// Print as JSON, suitable for --profile
        #[arg(long)]
        json: bool,
    },
}

/// Accept both `15.90` and the Brazilian `15,90`.
fn parse_amount(s: &str) -> Result<Decimal, String> {
    s.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount {:?}: {}", s, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("pixcode=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => commands::generate(&cli.merchant, args).await?,
        Commands::Decode { payload } => commands::decode(payload)?,
        Commands::Profile { json } => commands::show_profile(&cli.merchant, json)?,
    }

    Ok(())
}
