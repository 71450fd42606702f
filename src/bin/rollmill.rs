//! rollmill: flatten nested JSON into tables, merge it, or dissect it.
//!
//! Usage:
//!   # Pivot one nested object into CSV on stdout
//!   rollmill data.json --csv
//!
//!   # NDJSON to a Markdown report with a row filter
//!   rollmill events.jsonl --md report.md --filter 'status=active,age>=21'
//!
//!   # Merge every input object into a single document, 2-space indent
//!   rollmill a.json b.json --merge 2
//!
//!   # Leaf properties from stdin
//!   echo '{"a": {"b": 1}}' | rollmill --properties

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use rollmill::input;
use rollmill::ops;
use rollmill::render;
use rollmill::table::{RollConfig, TableRoller};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "rollmill")]
#[command(about = "Flatten nested JSON into tables", long_about = None)]
struct Args {
    /// Input files, .csv or JSON (use stdin if omitted)
    #[arg(value_name = "FILE")]
    inputs: Vec<String>,

    /// Comma-separated replacement names for the pivot layer columns
    #[arg(short, long, value_name = "key1,key2")]
    keys: Option<String>,

    /// Comma-separated filter clauses (= != >= <= > <), AND-combined
    #[arg(short, long, value_name = "column=value,...")]
    filter: Option<String>,

    /// Output table CSV (omit the value for stdout)
    #[arg(short = 'c', long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    csv: Option<String>,

    /// Output table TSV (omit the value for stdout)
    #[arg(short = 't', long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    tsv: Option<String>,

    /// Output Markdown table (omit the value for stdout)
    #[arg(short = 'm', long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    md: Option<String>,

    /// Output sortable HTML table (omit the value for stdout)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    html: Option<String>,

    /// Output the table as a JSON array of row objects
    #[arg(short = 'j', long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    json: Option<String>,

    /// Dissect input into properties, one leaf path per line
    #[arg(short = 'p', long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    properties: Option<String>,

    /// Merge all input objects into a single object, indented by
    /// SPACES (0 = compact)
    #[arg(short = 'e', long, value_name = "SPACES", num_args = 0..=1, default_missing_value = "0")]
    merge: Option<usize>,

    /// Dissect input into one single-leaf fragment per line
    #[arg(short = 'd', long)]
    dissect: bool,

    /// Recursion bound for deeply nested documents
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RollConfig {
        verbose: args.verbose,
        filter: args.filter.clone(),
        ..RollConfig::default()
    };
    if let Some(keys) = &args.keys {
        config.layer_key_names = keys.split(',').map(|key| key.trim().to_string()).collect();
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }

    let mut roller = TableRoller::new(config.clone());
    let mut working: Vec<Value> = Vec::new();

    if args.inputs.is_empty() {
        let mut data = String::new();
        std::io::stdin()
            .read_to_string(&mut data)
            .context("reading stdin")?;
        working.extend(input::read_json_data(&data, config.verbose).values);
    } else {
        for filename in &args.inputs {
            let filename = filename.trim();
            if let Err(err) = read_one_input(filename, &mut roller, &mut working, config.verbose) {
                eprintln!("rollmill: skipping {filename}: {err:#}");
            }
        }
    }

    if working.is_empty() {
        anyhow::bail!("no input documents; pass FILE arguments or pipe JSON to stdin (--help for usage)");
    }
    if config.verbose {
        eprintln!("rollmill: root objects: {}", working.len());
    }

    let wants_table = args.csv.is_some()
        || args.tsv.is_some()
        || args.md.is_some()
        || args.html.is_some()
        || args.json.is_some();

    if wants_table {
        let table = roller.roll(&working)?;
        if let Some(target) = &args.csv {
            write_output(target, |out| render::write_csv(out, &table))?;
        }
        if let Some(target) = &args.html {
            write_output(target, |out| render::write_html(out, &table))?;
        }
        if let Some(target) = &args.json {
            write_output(target, |out| render::write_json(out, &table))?;
        }
        if let Some(target) = &args.tsv {
            write_output(target, |out| render::write_tsv(out, &table))?;
        }
        if let Some(target) = &args.md {
            write_output(target, |out| render::write_markdown(out, &table))?;
        }
    }

    if args.dissect {
        print_fragments(&working);
    }

    if let Some(indent) = args.merge {
        print_merged(&Value::Object(ops::merge_batch(&working)), indent)?;
    }

    if let Some(target) = &args.properties {
        let entries = if working.len() == 1 {
            ops::dissect_properties(&working[0])?
        } else {
            ops::dissect_properties(&Value::Array(working.clone()))?
        };
        write_output(target, |out| render::write_properties(out, &entries))?;
    }

    Ok(())
}

/// Read one input source into the working batch. CSV headers are
/// pre-registered so they lead the output column order.
fn read_one_input(
    filename: &str,
    roller: &mut TableRoller,
    working: &mut Vec<Value>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("rollmill: reading {filename}");
    }
    let is_csv = Path::new(filename)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = File::open(filename).with_context(|| format!("opening {filename}"))?;
        let (headers, values) = input::read_csv_data(file)?;
        roller.register_columns(&headers);
        working.extend(values);
    } else {
        let data =
            std::fs::read_to_string(filename).with_context(|| format!("reading {filename}"))?;
        working.extend(input::read_json_data(&data, verbose).values);
    }
    Ok(())
}

/// Run a renderer against a file target, or stdout for `-`.
fn write_output<F>(target: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut Box<dyn Write>) -> Result<()>,
{
    let mut out: Box<dyn Write> = if target == "-" {
        Box::new(std::io::stdout())
    } else {
        let file = File::create(target).with_context(|| format!("creating {target}"))?;
        Box::new(BufWriter::new(file))
    };
    write(&mut out)?;
    out.flush().context("flushing output")?;
    Ok(())
}

fn print_fragments(working: &[Value]) {
    for value in working {
        match value {
            Value::Object(object) => {
                for fragment in ops::dissect_object(object) {
                    println!("{fragment}");
                }
            }
            other => println!("{other}"),
        }
    }
}

fn print_merged(merged: &Value, indent: usize) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if indent == 0 {
        writeln!(out, "{merged}").context("writing merged object")?;
    } else {
        let indent_text = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_text);
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        merged
            .serialize(&mut serializer)
            .context("writing merged object")?;
        writeln!(out).context("writing merged object")?;
    }
    Ok(())
}
