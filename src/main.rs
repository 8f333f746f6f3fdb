use agrisurvey_processor::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(commands::run(args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Agrisurvey Processor - Field Survey & Weather Data Cleaner");
    println!("==========================================================");
    println!();
    println!("Clean agricultural field survey records from a SQLite database and");
    println!("aggregate weather station sensor readings fetched over HTTP.");
    println!();
    println!("USAGE:");
    println!("    agrisurvey-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    fields      Clean the field survey table and merge the station mapping");
    println!("    weather     Extract measurements from station messages and average them");
    println!("    run         Run both pipelines");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    TOML configuration file (default: agrisurvey.toml)");
    println!("    -o, --output <PATH>    Directory for Parquet output files");
    println!("        --log-level <LVL>  error, warn, info, debug or trace");
    println!("    -q, --quiet            Suppress the summary report");
    println!();
    println!("EXAMPLES:");
    println!("    # Run both pipelines with the default configuration:");
    println!("    agrisurvey-processor run");
    println!();
    println!("    # Weather pipeline only, writing station means to ./output:");
    println!("    agrisurvey-processor weather --output ./output");
    println!();
    println!("For detailed help on any command, use:");
    println!("    agrisurvey-processor <COMMAND> --help");
}
