//! Benchmark runner for the multiplication strategies.
//!
//! Usage: `matmul-kernels [SIZE ...]` (default sizes: 64 128 256).
//! Set `RUST_LOG=debug` to see dispatch decisions.

use matmul_kernels::harness::{bench, random_matrix, validate};
use matmul_kernels::{MultiplyOptions, Result, Strategy};

const ITERATIONS: usize = 3;

fn main() {
    env_logger::init();

    let sizes: Vec<usize> = {
        let parsed: Vec<usize> = std::env::args()
            .skip(1)
            .filter_map(|arg| arg.parse().ok())
            .filter(|&size| size > 0)
            .collect();
        if parsed.is_empty() {
            vec![64, 128, 256]
        } else {
            parsed
        }
    };

    if let Err(err) = run(&sizes) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(sizes: &[usize]) -> Result<()> {
    println!("=== Matrix Multiplication Benchmark ===\n");

    let opts = MultiplyOptions::default();
    println!(
        "block size = {}, lane width = {}, workers = {}\n",
        opts.block_size,
        opts.lane_width,
        opts.worker_count()
    );

    let mut all_results = Vec::new();

    for &size in sizes {
        println!("Matrix: {}×{}", size, size);
        println!("{}", "-".repeat(60));

        let a = random_matrix(size, size, 1)?;
        let b = random_matrix(size, size, 2)?;

        let mut results = Vec::new();
        for strategy in Strategy::ALL {
            let report = validate(&a, &b, strategy, &opts)?;
            let sample = bench(&a, &b, strategy, &opts, ITERATIONS)?;
            let time_ms = sample.mean().as_secs_f64() * 1000.0;
            results.push((strategy, time_ms, sample.gflops(), report.passed));
        }

        let baseline_time = results[0].1;
        for (i, (strategy, time_ms, gflops, passed)) in results.iter().enumerate() {
            println!(
                "{}. {:12} {:8.2} ms  {:6.2} GFLOPS  ({:.1}×)  {}",
                i + 1,
                strategy.name(),
                time_ms,
                gflops,
                baseline_time / time_ms,
                if *passed { "ok" } else { "MISMATCH" }
            );
        }
        println!();

        all_results.push((size, results));
    }

    print_summary_table(&all_results);
    Ok(())
}

#[allow(clippy::type_complexity)]
fn print_summary_table(all_results: &[(usize, Vec<(Strategy, f64, f64, bool)>)]) {
    println!("{}", "=".repeat(60));
    println!("SUMMARY (GFLOPS)");
    println!("{}", "=".repeat(60));

    print!("{:<12}", "Method");
    for (size, _) in all_results {
        print!(" {:>12}", format!("{}×{}", size, size));
    }
    println!();

    for (idx, strategy) in Strategy::ALL.iter().enumerate() {
        print!("{:<12}", strategy.name());
        for (_, results) in all_results {
            print!(" {:>12.2}", results[idx].2);
        }
        println!();
    }

    println!("{}", "=".repeat(60));
    println!("\nSpeedup in the per-size tables is relative to naive. Higher is better.\n");
}
