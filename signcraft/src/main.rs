use clap::Parser;
use signcraft_core::{DesignDocument, EditorSession, SignageConfig};
use signcraft_raster::{Exporter, FontRegistry, FontSource};
use std::path::PathBuf;

/// signcraft: render a saved signage design into a cart-ready image
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the saved design document (JSON)
    #[clap(short, long)]
    pub input: String,

    /// Path to a local catalog config file (JSON)
    #[clap(short, long)]
    pub config: Option<String>,

    /// URL of the catalog config endpoint (fail-open to defaults)
    #[clap(long)]
    pub config_url: Option<String>,

    /// Path to the output image (.png for PNG, anything else for JPEG)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Print the export as a data URL on stdout instead of writing a file
    #[clap(long)]
    pub data_url: bool,

    /// Additional directory to scan for font files
    #[clap(long)]
    pub font_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args: Args = Args::parse();

    // Load catalog config: local file, remote endpoint, or defaults.
    let config = if let Some(path) = &args.config {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) => {
                eprintln!("Failed to open config file: {}\n{}", path, err);
                std::process::exit(1);
            }
        };
        match SignageConfig::from_reader(file) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to parse config file: {}\n{}", path, err);
                std::process::exit(1);
            }
        }
    } else if let Some(url) = &args.config_url {
        SignageConfig::fetch(url)
    } else {
        SignageConfig::default()
    };

    // Read the saved design document.
    let design_str = match std::fs::read_to_string(&args.input) {
        Ok(design_str) => design_str,
        Err(err) => {
            eprintln!("Failed to read input file: {}\n{}", args.input, err);
            std::process::exit(1);
        }
    };
    let doc = match serde_json::from_str::<DesignDocument>(&design_str) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("Failed to parse input file as JSON: {}", err);
            std::process::exit(1);
        }
    };

    // Resume the session and prepare the exporter.
    let mut session = match EditorSession::with_document(config, &doc) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Invalid design document: {}", err);
            std::process::exit(1);
        }
    };

    let mut registry = FontRegistry::with_system_fonts();
    if let Some(dir) = &args.font_dir {
        registry.register(FontSource::Dir(dir.clone()));
    }
    let mut exporter = Exporter::new(registry);

    // Saved designs without an explicit box need a fresh auto-fit.
    exporter.auto_fit(&session.config, &mut session.layout);
    let snapshot = session.snapshot();

    if args.data_url {
        match exporter.export(&snapshot) {
            Ok(submission) => println!("{}", submission.image),
            Err(err) => {
                eprintln!("Export failed: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(output) = &args.output else {
        eprintln!("Either --output or --data-url is required");
        std::process::exit(1);
    };

    let result = if output.ends_with(".png") {
        exporter.export_png(&snapshot)
    } else {
        exporter.export_jpeg(&snapshot)
    };
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Export failed: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = std::fs::write(output, bytes) {
        eprintln!("Failed to write export output to {}\n{}", output, err);
        std::process::exit(1);
    }
    log::info!(target: "cli", "wrote {}", output);
}
