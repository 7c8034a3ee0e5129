//! # JGrass Console CLI
//!
//! Thin front end over `jgc_compiler`: load a model manifest, run one
//! console line or compile a script file, and report the result in the
//! collector's cargo-style format.

use std::path::Path;
use std::path::PathBuf;

use clap::Parser;

use jgc_compiler::logging::{self, codes};
use jgc_compiler::pipeline::CompileOutput;
use jgc_compiler::symbols::ModelRegistry;
use jgc_compiler::utils::SourceMap;
use jgc_compiler::{log_warning, Interpreter, PipelineError};

/// JGrass console command interpreter
#[derive(Debug, Parser)]
#[command(name = "jgc", version, about = "JGrass console command interpreter")]
struct Cli {
    /// Script file to compile (.jgs or .jgrass)
    script: Option<PathBuf>,

    /// Interpret one console line instead of a script file
    #[arg(
        short = 'c',
        long = "command",
        value_name = "LINE",
        conflicts_with = "script"
    )]
    command: Option<String>,

    /// Model manifest declaring native models, component models, and types
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Print the compile report as pretty JSON
    #[arg(long)]
    json: bool,

    /// Print the parse tree outline
    #[arg(long)]
    outline: bool,
}

fn main() {
    env_logger::init();
    if let Err(error) = logging::init_global_logging() {
        logging::safe_log_critical(codes::system::INITIALIZATION_FAILURE, &error);
        std::process::exit(1);
    }

    let cli = Cli::parse();
    log::debug!("jgc starting with {:?}", cli);
    log::debug!("{}", logging::get_system_diagnostics());

    let interpreter = match build_interpreter(cli.manifest.as_deref()) {
        Ok(interpreter) => interpreter,
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code().as_str(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    };

    let (result, source_text) = if let Some(line) = &cli.command {
        (interpreter.interpret_line(line), Some(line.clone()))
    } else if let Some(script) = &cli.script {
        let source = std::fs::read_to_string(script).ok();
        (interpreter.compile_file(script), source)
    } else {
        eprintln!("error: nothing to do; pass a script file or -c <LINE>");
        eprintln!("usage: jgc [OPTIONS] [SCRIPT]  (try --help)");
        std::process::exit(2);
    };

    match result {
        Ok(output) => {
            report_success(&cli, &output);
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            report_failure(&error, source_text.as_deref(), cli.json);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

/// Build the session interpreter: from a manifest when one is given,
/// otherwise with an empty registry. Without registered models every
/// statement falls to the component parser and fails to bind, so the
/// empty registry is only useful for classification and script checks.
fn build_interpreter(manifest: Option<&Path>) -> Result<Interpreter, PipelineError> {
    match manifest {
        Some(path) => Interpreter::from_manifest_path(path),
        None => {
            log_warning!("No model manifest given; model names will not resolve");
            Ok(Interpreter::with_registry(ModelRegistry::empty()))
        }
    }
}

fn report_success(cli: &Cli, output: &CompileOutput) {
    println!("=== JGrass Console Compile Report ===");
    println!("route: {}", output.route.describe());
    println!(
        "blocks: {}  statements: {}  nodes: {}  tokens: {}",
        output.stats.block_count,
        output.stats.statement_count,
        output.stats.node_count,
        output.stats.token_count
    );
    println!("duration: {:.2} ms", output.stats.duration_ms);

    if cli.outline {
        println!();
        println!("--- Parse Tree ---");
        print!("{}", output.tree.outline());
    }

    if cli.json {
        match output.to_json_pretty() {
            Ok(json) => println!("{}", json),
            Err(error) => eprintln!("error: report serialization failed: {}", error),
        }
    }
}

fn report_failure(error: &PipelineError, source: Option<&str>, json: bool) {
    if json {
        let report = serde_json::json!({
            "status": "error",
            "code": error.error_code().as_str(),
            "message": error.to_string(),
        });
        if let Ok(text) = serde_json::to_string_pretty(&report) {
            println!("{}", text);
        }
    }

    eprintln!("error[{}]: {}", error.error_code().as_str(), error);

    // Caret rendering only makes sense when the span indexes the source
    // we actually have; spans from a file routed through `-c` do not.
    if let (Some(span), Some(source)) = (error.span(), source) {
        if span.end.offset <= source.len() {
            let map = SourceMap::new(source.to_string());
            eprint!("{}", map.format_error(&span, &error.to_string()));
        }
    }
}
