use clap::{Arg, ArgMatches, Command};
use eml_analyzer::{AnalyzerConfig, EmailAnalyzer, OutputFormat, ParsedMessage, ReportFormatter};
use log::LevelFilter;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("eml-analyzer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Analyzes .eml files for email security risks")
        .long_about(
            "Inspects the authentication and routing headers of a single message \
             (Received-SPF, DKIM-Signature, Authentication-Results, Received) and \
             reports a SAFE/UNSAFE verdict.\n\n\
             The checks are header heuristics only: no DNS lookups are made and \
             DKIM signatures are not cryptographically verified.",
        )
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Path to the .eml file to analyze")
                .required_unless_present("generate-config"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/eml-analyzer.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging of each classification step")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    if let Err(e) = run(&matches) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config_path = matches
        .get_one::<String>("config")
        .expect("config has a default value");
    let mut config = load_config(config_path)?;
    if matches.get_flag("json") {
        config.output_format = OutputFormat::Json;
    }

    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| anyhow::anyhow!("No message file given"))?;
    analyze_file(&config, Path::new(file))
}

fn analyze_file(config: &AnalyzerConfig, path: &Path) -> anyhow::Result<()> {
    let display_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let message = ParsedMessage::from_file(path)?;

    if config.output_format == OutputFormat::Text {
        println!("Analyzing: {}", display_path.display());
        println!();
    }

    let report = EmailAnalyzer::new().analyze(&message);
    print!("{}", ReportFormatter::new(config).render(&report)?);
    if config.output_format == OutputFormat::Json {
        println!();
    }

    Ok(())
}

fn load_config(path: &str) -> anyhow::Result<AnalyzerConfig> {
    if Path::new(path).exists() {
        AnalyzerConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Error loading configuration '{path}': {e}"))
    } else {
        log::debug!("Configuration file '{path}' not found, using default configuration");
        Ok(AnalyzerConfig::default())
    }
}

fn generate_default_config(path: &str) {
    let config = AnalyzerConfig::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}
