//! # fieldreport CLI
//!
//! Usage:
//!   fieldreport render record.json --title "Material Turnover"
//!   fieldreport render record.json --title Repair --photo a.jpg --photo b.jpg
//!   fieldreport render - --title Incident --email-to office@example.com --subject "Incident 1234"
//!   fieldreport example > record.json

use clap::Parser;
use fieldreport::cli;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args).await {
        eprintln!("✗ {:#}", err);
        std::process::exit(1);
    }
}
