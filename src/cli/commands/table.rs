//! Table command - summarise and convert saved lookup tables

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use statrs::statistics::Statistics;

use crate::{
    cli::{
        commands::{KeySpaceSource, load_table, resolve_key_space, save_table},
        config::{QuantizerFile, load_or_default},
        output::{format_number, print_kv, print_section, print_subsection, print_stats_table},
    },
    q_learning::LookupTable,
};

#[derive(Parser, Debug)]
#[command(about = "Summarise a saved lookup table")]
pub struct TableArgs {
    /// Saved table (`.csv`, otherwise MessagePack)
    pub table: PathBuf,

    /// Key ranges the table is checked against while loading
    #[arg(long, value_enum, default_value = "observed")]
    pub key_space: KeySpaceSource,

    /// JSON file with a `quantizer` section for declared key spaces
    #[arg(long)]
    pub quantizer: Option<PathBuf>,

    /// Write the table here, converting format by extension
    #[arg(long)]
    pub convert: Option<PathBuf>,

    /// Print the highest-valued entries
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

/// Entry count per trailing (action) component.
fn entries_per_action(table: &LookupTable) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for (key, _) in table.entries() {
        if let Some(action) = key.action() {
            *counts.entry(action).or_insert(0) += 1;
        }
    }
    counts
}

pub fn execute(args: TableArgs) -> Result<()> {
    let quantizer: QuantizerFile = load_or_default(args.quantizer.as_deref())?;
    let declared = args.key_space.declared(&quantizer.quantizer)?;
    let table = load_table(&args.table, declared.as_ref())?;

    print_section("Lookup Table");
    print_kv("File", &args.table.display().to_string());
    print_kv("Entries", &format_number(table.len()));
    if table.is_empty() {
        return Ok(());
    }

    let key_space = resolve_key_space(declared, &table)?;
    let values: Vec<f64> = table.entries().map(|(_, value)| value).collect();
    let (lo, hi) = table.value_range().unwrap_or_default();
    let coverage = table.len() as f64 / key_space.cardinality().max(1) as f64;
    print_stats_table(&[
        ("Key arity", key_space.arity().to_string()),
        ("Key space size", key_space.cardinality().to_string()),
        ("Coverage", format!("{:.2}%", coverage * 100.0)),
        ("Min value", format!("{lo:.4}")),
        ("Max value", format!("{hi:.4}")),
        ("Mean value", format!("{:.4}", values.iter().mean())),
        ("Std dev", format!("{:.4}", values.iter().std_dev())),
    ]);

    print_subsection("Key Ranges");
    for (index, bounds) in key_space.dimensions().iter().enumerate() {
        print_kv(
            &format!("k{index}"),
            &format!("[{}, {}]", bounds.floor, bounds.ceiling),
        );
    }

    print_subsection("Entries per Action");
    for (action, count) in entries_per_action(&table) {
        print_kv(&format!("action {action}"), &format_number(count));
    }

    if args.top > 0 {
        print_subsection("Top Entries");
        let mut ranked = table.sorted_entries();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (key, value) in ranked.into_iter().take(args.top) {
            print_kv(&key.to_string(), &format!("{value:.4}"));
        }
    }

    if let Some(path) = &args.convert {
        save_table(&table, path)?;
        println!("\nWrote {} entries to {}", table.len(), path.display());
    }

    Ok(())
}
