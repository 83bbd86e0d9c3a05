use lineage_layout::config::LayoutConfig;
use lineage_layout::layout::LayoutEngine;
use lineage_layout::model::TimelineInput;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.map(|v| v.parse::<T>()) {
        Some(Ok(n)) => n,
        _ => {
            eprintln!("{} expects a number", flag);
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        eprintln!("  -w, --width <px>      Canvas width (default: 1200)");
        eprintln!("  -s, --stretch <f>     Horizontal stretch factor (default: 1)");
        eprintln!("  -y, --year <year>     Current year (default: system clock)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut config = LayoutConfig::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-w" | "--width" => {
                i += 1;
                config.canvas_width = parse_number(&args[i - 1], args.get(i));
            }
            "-s" | "--stretch" => {
                i += 1;
                config.stretch = parse_number(&args[i - 1], args.get(i));
            }
            "-y" | "--year" => {
                i += 1;
                config.current_year = Some(parse_number(&args[i - 1], args.get(i)));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let source = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let input = match TimelineInput::from_json(&source) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Input error: {}", e);
            process::exit(1);
        }
    };

    let engine = match LayoutEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let json = match engine
        .layout(&input)
        .and_then(|layout| Ok(serde_json::to_string_pretty(&layout)?))
    {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Layout error: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}
