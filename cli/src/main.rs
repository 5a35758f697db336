mod test_runner;

use std::path::Path;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{EnvFilter, fmt};

use blockdef::loader::Loader;
use blockdef::{Composition, CompositionTree, NodeId};
use codegen::{GeneratedArtifact, GenerationDiagnostic};

const SUBCOMMANDS: &[&str] = &["generate", "check", "test", "help"];

#[derive(Parser)]
#[command(name = "blockdef", version, about = "Block definition and glue code generator")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log more (-v debug, -vv trace). RUST_LOG applies when absent.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the artifacts for a composition file
    Generate(GenerateArgs),

    /// Load and generate without printing (exit 0 if there are no errors)
    Check(CheckArgs),

    /// Run .test.toml fixture files
    Test(TestArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Part {
    Definition,
    Declaration,
    Body,
    /// Declaration and body joined by the delimiter
    Glue,
    Export,
    All,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// TOML composition file
    file: String,

    /// Which artifact to print
    #[arg(short, long, value_enum, default_value_t = Part::All)]
    part: Part,

    /// Dump the loaded composition tree instead of generating
    #[arg(long)]
    tree: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// TOML composition file
    file: String,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `blockdef file.toml` works like `blockdef generate file.toml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().skip(1).position(|a| !a.starts_with('-')) {
        let pos = pos + 1;
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "generate".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(generate_args) => do_generate(generate_args, cli.no_color),
        Command::Check(check_args) => do_check(check_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Where diagnostics of one command go, and the files they point into.
struct Session {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl Session {
    fn new(no_color: bool) -> Self {
        let color_choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Session {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(color_choice),
            config: term::Config::default(),
        }
    }

    fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit_to_write_style(
            &mut self.writer.lock(),
            &self.config,
            &self.files,
            diagnostic,
        );
    }

    /// Read and load a composition file, reporting failures and exiting.
    fn load(&mut self, path: &str) -> Composition {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", path, e);
                process::exit(1);
            }
        };

        let file_id = self.files.add(path.to_string(), source.clone());
        match Loader::new(source, file_id).load() {
            Ok(composition) => {
                tracing::info!(file = path, nodes = composition.len(), "loaded composition");
                composition
            }
            Err(errors) => {
                for error in &errors {
                    self.emit(&error.to_diagnostic());
                }
                process::exit(1);
            }
        }
    }

    /// Generate, printing warnings. Exits on a hard error.
    fn generate(&self, composition: &Composition) -> GeneratedArtifact {
        match codegen::generate(composition) {
            Ok((artifact, warnings)) => {
                self.emit_all(&warnings);
                tracing::info!(block = %artifact.block_type, warnings = warnings.len(), "generated");
                artifact
            }
            Err(error) => {
                self.emit(&GenerationDiagnostic::from(error).to_diagnostic());
                process::exit(1);
            }
        }
    }

    fn emit_all(&self, diagnostics: &[GenerationDiagnostic]) {
        for diagnostic in diagnostics {
            self.emit(&diagnostic.to_diagnostic());
        }
    }
}

fn do_generate(args: GenerateArgs, no_color: bool) {
    let mut session = Session::new(no_color);
    let composition = session.load(&args.file);

    if args.tree {
        for top in composition.top_blocks() {
            print_tree(&composition, top, 0);
        }
        return;
    }

    let artifact = session.generate(&composition);
    let export = match artifact.export.to_json_pretty() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("error: cannot serialize export: {}", e);
            process::exit(1);
        }
    };

    match args.part {
        Part::Definition => println!("{}", artifact.definition),
        Part::Declaration => print!("{}", artifact.glue_declaration),
        Part::Body => println!("{}", artifact.glue_body),
        Part::Glue => println!("{}", artifact.glue()),
        Part::Export => println!("{}", export),
        Part::All => {
            println!("// definition\n{}\n", artifact.definition);
            println!("// declaration{}", artifact.glue_declaration);
            println!("// body\n{}\n", artifact.glue_body);
            println!("// export\n{}", export);
        }
    }
}

fn do_check(args: CheckArgs, no_color: bool) {
    let mut session = Session::new(no_color);
    let composition = session.load(&args.file);
    let artifact = session.generate(&composition);
    eprintln!("ok: {} generates block '{}'", args.file, artifact.block_type);
}

/// One line per node: kind, fields, then every occupied slot indented below.
fn print_tree(composition: &Composition, id: NodeId, depth: usize) {
    let mut current = Some(id);
    while let Some(id) = current {
        let Some(node) = composition.node(id) else {
            return;
        };
        let pad = "  ".repeat(depth);
        let fields = node
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}{} {} {}", pad, id, node.kind, fields);
        for slot in &node.slots {
            if let Some(target) = slot.target {
                println!("{}  [{}]", pad, slot.name);
                print_tree(composition, target, depth + 2);
            }
        }
        current = node.next;
    }
}
