//! Demo: runs every pipeline operation over the sample car fleet and prints the results.

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use serde::Serialize;

use record_pipeline::PipelineResult;
use record_pipeline::execution::{ExecutionEngine, ExecutionOptions, LogExecutionObserver};
use record_pipeline::processing::{DuplicateKeyPolicy, NestedGroups, Partition, Sequence};
use record_pipeline::types::{Record, RecordSet};

#[derive(Debug, Parser)]
#[command(name = "record-pipeline", long_about = None)]
#[command(about = "Filter, map, flat-map, partition and group the sample car fleet")]
struct Cli {
    /// Run the operations on the chunked parallel engine
    #[arg(long)]
    parallel: bool,

    /// Worker threads for the parallel engine (defaults to available parallelism)
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Records per chunk for the parallel engine
    #[arg(long, requires = "parallel")]
    chunk_size: Option<usize>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    sedans: Vec<&'a Record>,
    makes: Vec<&'a str>,
    non_empty_makes: Vec<&'a str>,
    makes_and_models: Vec<&'a str>,
    even_numbers: usize,
    predicate_calls: usize,
    partitioned: Partition<&'a Record>,
    grouped: NestedGroups<&'a str, &'a str, i64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let cars = RecordSet::sample();
    info!("loaded {} sample records", cars.len());

    let report = if cli.parallel {
        let defaults = ExecutionOptions::default();
        let threads = cli.threads.or(defaults.num_threads);
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: threads,
            chunk_size: cli.chunk_size.unwrap_or(defaults.chunk_size),
            max_in_flight_chunks: threads.unwrap_or(defaults.max_in_flight_chunks),
        })?
        .with_observer(std::sync::Arc::new(LogExecutionObserver));
        parallel_report(&cars, &engine)?
    } else {
        sequential_report(&cars)?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn sequential_report(cars: &RecordSet) -> PipelineResult<Report<'_>> {
    let (even_numbers, predicate_calls) = lazy_count_demo();
    Ok(Report {
        sedans: cars.seq().filter(|car| car.category() == "sedan").to_vec(),
        makes: cars.seq().map(|car| car.manufacturer()).to_vec(),
        non_empty_makes: cars
            .seq()
            .map(|car| car.manufacturer())
            .filter(|make| !make.is_empty())
            .to_vec(),
        makes_and_models: cars
            .seq()
            .flat_map(|car| [car.manufacturer(), car.model()])
            .to_vec(),
        even_numbers,
        predicate_calls,
        partitioned: cars.seq().partition_by(|car| car.category() == "sedan"),
        grouped: cars.seq().group_by_then_project(
            |car| car.category(),
            |car| car.manufacturer(),
            |car| car.attribute(),
        )?,
    })
}

fn parallel_report<'a>(
    cars: &'a RecordSet,
    engine: &ExecutionEngine,
) -> PipelineResult<Report<'a>> {
    let records = cars.as_slice();
    let (even_numbers, predicate_calls) = lazy_count_demo();
    let makes = engine.map_parallel(records, |car| car.manufacturer());
    let non_empty_makes = makes.iter().copied().filter(|make| !make.is_empty()).collect();
    Ok(Report {
        sedans: engine.filter_parallel(records, |car| car.category() == "sedan"),
        makes,
        non_empty_makes,
        makes_and_models: engine
            .flat_map_parallel(records, |car| [car.manufacturer(), car.model()]),
        even_numbers,
        predicate_calls,
        partitioned: engine.partition_parallel(records, |car| car.category() == "sedan"),
        grouped: engine.group_by_then_project_parallel(
            records,
            DuplicateKeyPolicy::Reject,
            |car| car.category(),
            |car| car.manufacturer(),
            |car| car.attribute(),
        )?,
    })
}

/// Count the even numbers in 10..=14, showing that the predicate only runs on consumption.
fn lazy_count_demo() -> (usize, usize) {
    let calls = AtomicUsize::new(0);
    let numbers = [10, 11, 12, 13, 14];
    let evens = Sequence::from_slice(&numbers).filter(|n| {
        calls.fetch_add(1, Ordering::SeqCst);
        debug!("filtering {n}");
        *n % 2 == 0
    });
    debug!("pipeline built, predicate calls so far: {}", calls.load(Ordering::SeqCst));
    let count = evens.count();
    (count, calls.load(Ordering::SeqCst))
}

fn print_text(report: &Report<'_>) {
    println!("sedan cars:");
    for car in &report.sedans {
        println!("  {car}");
    }
    println!("makes = {:?}", report.makes);
    println!("non-empty makes = {:?}", report.non_empty_makes);
    println!("makes and models = {:?}", report.makes_and_models);
    println!(
        "even numbers in 10..=14 = {} ({} predicate calls)",
        report.even_numbers, report.predicate_calls
    );

    println!("partitioned cars:");
    for (label, outcome) in [("sedan", true), ("other", false)] {
        let models: Vec<String> = report
            .partitioned
            .get(outcome)
            .iter()
            .map(|car| format!("{}-{}", car.manufacturer(), car.model()))
            .collect();
        println!("  {label}: {models:?}");
    }

    println!("grouped cars:");
    for (category, makes) in &report.grouped {
        println!("  {category}: {makes:?}");
    }
}
