use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use fluent_dom::script;

/// Replay a JSON script of builder operations and print the resulting markup.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Script file (a JSON array of ops). Reads stdin when omitted or `-`.
    script: Option<PathBuf>,
    /// Tag of the root element the script is bound to
    #[arg(long, default_value = "body")]
    root: String,
    /// Print only the root's children (optional flag)
    #[arg(long)]
    inner: bool,
    /// More logging on stderr; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Read the script source.
    let src = match read_source(args.script.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot read script: {e}");
            std::process::exit(1);
        }
    };

    // Parse ops.
    let ops = match script::parse(&src) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("Invalid script: {e}");
            std::process::exit(1);
        }
    };

    // Bind a fresh root and replay.
    let (mut builder, root) = match fluent_dom::memory_builder(&args.root) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Invalid root tag: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = script::replay(&mut builder, &ops) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    // Output result.
    let dom = builder.dom();
    if args.inner {
        println!("{}", dom.inner_html(root));
    } else {
        println!("{}", dom.outer_html(root));
    }
}

fn read_source(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
