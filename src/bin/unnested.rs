// ABOUTME: CLI binary for the unnested comment-thread flattener.
// ABOUTME: Reads a post page's HTML, applies the flattened layout, and writes the result.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use unnested::{PageMarkup, Transformer};

#[derive(Parser, Debug)]
#[command(name = "unnested")]
#[command(about = "Flatten nested comment threads in a post page's HTML")]
struct Args {
    /// HTML file to transform (reads stdin when omitted or "-")
    #[arg()]
    input: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Reveal a comment after transforming, e.g. "#comment-123"
    #[arg(long = "fragment")]
    fragment: Option<String>,

    /// Depths at or below this threshold are left unaltered
    #[arg(long = "shallow-depth")]
    shallow_depth: Option<u32>,

    /// Depth at which reply chains collapse behind a disclosure
    #[arg(long = "collapse-depth")]
    collapse_depth: Option<u32>,

    /// Depth at or past which the reply control is disabled
    #[arg(long = "reply-depth-limit")]
    reply_depth_limit: Option<u32>,

    /// JSON file describing an alternate page markup adapter
    #[arg(long = "markup")]
    markup: Option<PathBuf>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

fn read_input(input: &Option<PathBuf>) -> io::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn build_transformer(args: &Args) -> Result<Transformer, String> {
    let mut builder = Transformer::builder();
    if let Some(depth) = args.shallow_depth {
        builder = builder.shallow_depth(depth);
    }
    if let Some(depth) = args.collapse_depth {
        builder = builder.collapse_depth(depth);
    }
    if let Some(depth) = args.reply_depth_limit {
        builder = builder.reply_depth_limit(depth);
    }
    if let Some(path) = &args.markup {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("error reading markup file {:?}: {}", path, e))?;
        let markup: PageMarkup = serde_json::from_str(&raw)
            .map_err(|e| format!("error parsing markup file {:?}: {}", path, e))?;
        builder = builder.markup(markup);
    }
    builder.build().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let transformer = match build_transformer(&args) {
        Ok(t) => t,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(1);
        }
    };

    let html = match read_input(&args.input) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("error reading input: {}", e);
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();
    let mut result = match transformer.transform(&html) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error transforming page: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(fragment) = &args.fragment {
        if let Some(revealed) = transformer.reveal_anchor(&result, fragment) {
            result = revealed;
        }
    }

    let elapsed = start.elapsed();

    if let Some(output_path) = &args.output {
        if let Err(e) = fs::write(output_path, &result) {
            eprintln!("error writing to {:?}: {}", output_path, e);
            return ExitCode::from(1);
        }
    } else {
        println!("{}", result);
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    ExitCode::SUCCESS
}
