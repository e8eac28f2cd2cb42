use schemadnd::script;
use schemadnd::serializer;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Erd,
    Json,
}

impl Format {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "erd" => Some(Self::Erd),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <script> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        eprintln!("  -f, --format <fmt>    Output format: erd, json (default: erd)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut format = Format::Erd;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-f" | "--format" => {
                i += 1;
                if i < args.len() {
                    format = Format::from_str(&args[i]).unwrap_or_else(|| {
                        eprintln!("Invalid format: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let store = match script::run(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Script error: {}", e);
            process::exit(1);
        }
    };
    tracing::info!(tables = store.len(), "script replayed");

    let output = match format {
        Format::Erd => serializer::serialize(&store),
        Format::Json => match serde_json::to_string_pretty(&store) {
            Ok(mut s) => {
                s.push('\n');
                s
            }
            Err(e) => {
                eprintln!("Failed to encode snapshot: {}", e);
                process::exit(1);
            }
        },
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}
