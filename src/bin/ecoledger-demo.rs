#![forbid(unsafe_code)]
//! Ledger walkthrough: mines a few traceability records into a fresh
//! in-memory ledger, verifies them, and prints the resulting chain.

use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use ecoledger::block::RecordInput;
use ecoledger::ledger::Ledger;

#[derive(Parser)]
#[command(name = "ecoledger-demo", version, about = "Mine and verify sample traceability records")]
struct Args {
    /// Leading hex zeros required of each mined block hash
    #[arg(long, default_value_t = 4)]
    difficulty: u32,
}

fn sample_records() -> Vec<RecordInput> {
    vec![
        RecordInput {
            subject_key: "pkg-1001".to_string(),
            material_origin: "Oregon Forests".to_string(),
            certification_type: "FSC Certified".to_string(),
            certification_number: "FSC-1001".to_string(),
            sustainability_score: 92.0,
        },
        RecordInput {
            subject_key: "pkg-1002".to_string(),
            material_origin: "Recycled Ocean Plastic".to_string(),
            certification_type: "OceanBound".to_string(),
            certification_number: "OB-4431".to_string(),
            sustainability_score: 88.0,
        },
        RecordInput {
            subject_key: "pkg-1003".to_string(),
            material_origin: "Bamboo, Sichuan".to_string(),
            certification_type: "Rainforest Alliance".to_string(),
            certification_number: "RA-2210".to_string(),
            sustainability_score: 95.5,
        },
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut ledger = Ledger::new(args.difficulty)?;

    println!(
        "\n{} (difficulty = {})\n",
        "EcoLedger traceability demo".bold(),
        args.difficulty
    );

    for record in sample_records() {
        let key = record.subject_key.clone();
        let start = Instant::now();
        let block = ledger.append_record(record)?;
        println!(
            "⛏️  mined {} in {:.3}s  nonce={}  hash={}…",
            key.cyan(),
            start.elapsed().as_secs_f64(),
            block.nonce,
            &block.hash[..16]
        );
    }

    println!();
    for key in ["pkg-1001", "pkg-9999"] {
        let verification = ledger.verify_record(key);
        let status = if verification.is_valid {
            "VALID".green().bold()
        } else if verification.record.is_none() {
            "NOT FOUND".yellow().bold()
        } else {
            "INVALID".red().bold()
        };
        println!("🔎 verify {:<10} → {}", key.cyan(), status);
    }

    let chain = ledger.chain();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Subject", "Origin", "Score", "Nonce", "Hash"]);
    for (i, block) in chain.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&block.subject_key),
            Cell::new(&block.material_origin),
            Cell::new(block.sustainability_score),
            Cell::new(block.nonce),
            Cell::new(format!("{}…", &block.hash[..12])),
        ]);
    }

    println!("\n{table}");
    println!("\nChain length: {}\n", chain.len());

    Ok(())
}
