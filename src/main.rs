use clap::Parser;
use groove::{encode, render_abc_with_options, GrooveError, RenderOptions};
use std::fs;
use std::process;

/// Convert a drum groove session string to ABC notation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session query string, or @path to a file containing one
    input: String,

    /// Write the output here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// YAML file with render options
    #[arg(long)]
    config: Option<String>,

    /// Put the kick in its own voice with stems down
    #[arg(long)]
    kick_stems_down: bool,

    /// Prepend the legend voices
    #[arg(long)]
    legend: bool,

    /// Page width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Print the normalised session string instead of ABC
    #[arg(long)]
    tab: bool,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(input: &str) -> Result<String, GrooveError> {
    match input.strip_prefix('@') {
        Some(path) => Ok(fs::read_to_string(path)?.trim().to_string()),
        None => Ok(input.to_string()),
    }
}

fn options(args: &Args) -> Result<RenderOptions, GrooveError> {
    let mut options = match &args.config {
        Some(path) => RenderOptions::load(path)?,
        None => RenderOptions::default(),
    };
    if args.kick_stems_down {
        options.kick_stems_up = Some(false);
    }
    if args.legend {
        options.show_legend = true;
    }
    if let Some(width) = args.width {
        options.render_width = width;
    }
    Ok(options)
}

fn run(args: &Args) -> Result<(), GrooveError> {
    let query = read_input(&args.input)?;
    let options = options(args)?;

    // diagnostics reach stderr through the logger as they are recorded
    let conversion = render_abc_with_options(&query, &options, 0);

    let output = if args.tab { format!("{}\n", encode(&conversion.score)) } else { conversion.abc };

    match &args.output {
        Some(path) => {
            fs::write(path, &output)?;
            eprintln!("Wrote {} to {}", if args.tab { "session" } else { "ABC" }, path);
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
