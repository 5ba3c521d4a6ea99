use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;

use shyaml::action::Action;
use shyaml::config::Config;
use shyaml::file::dumper::{Dump, DumpMode};
use shyaml::file::loader::{load_documents, InputMode};
use shyaml::stream::{run, write_outputs, Query, QueryError};

const ACTIONS_HELP: &str = "\
Actions:
  get-value           Print the value (scalars bare, other values as YAML)
  get-type            Print the type of the value (struct, sequence, str, ...)
  get-length          Print the number of elements of a sequence or struct
  get-values{,-0}     Print the elements of a sequence, or keys and values of a struct
  keys{,-0}           Print the keys of a struct
  values{,-0}         Print the values of a struct
  key-values{,-0}     Print the keys and values of a struct

The -0 variants terminate records with NUL instead of a newline.
KEY is a dot separated path; use \\. for a literal dot and \\\\ for a backslash.";

/// shyaml - query YAML documents from the shell
#[derive(Parser)]
#[command(name = "shyaml")]
#[command(version)]
#[command(about = "Query YAML documents read from standard input", long_about = None)]
#[command(after_help = ACTIONS_HELP)]
struct Cli {
    /// Render results as YAML, even scalars
    #[arg(short = 'y', long = "yaml")]
    yaml: bool,

    /// Don't print path and type errors (the exit status still reports them)
    #[arg(short, long)]
    quiet: bool,

    /// Read and answer one document at a time
    #[arg(short = 'L', long = "line-buffer")]
    line_buffer: bool,

    /// What to print about the selected value
    action: Action,

    /// Key path selecting the value (default: the whole document)
    #[arg(allow_hyphen_values = true)]
    key: Option<String>,

    /// Printed instead of failing when KEY is missing
    #[arg(allow_hyphen_values = true)]
    default: Option<String>,
}

fn init_logging() {
    let env = env_logger::Env::new().filter_or("SHYAML_LOG", "warn");
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version requests are not errors.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging();

    let config = Config::load().with_flags(cli.yaml, cli.quiet, cli.line_buffer);
    log::debug!("effective configuration: {:?}", config);

    match execute(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<QueryError>() {
                Some(query_err) if config.quiet && query_err.is_quietable() => {}
                // Already carries its cause in its message.
                Some(query_err) => eprintln!("Error: {}", query_err),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli, config: &Config) -> Result<()> {
    let dumper = if config.yaml_output {
        DumpMode::Yaml
    } else {
        DumpMode::Magic
    };
    let mode = if config.line_buffer {
        InputMode::LineBuffered
    } else {
        InputMode::Buffered
    };

    let query = Query::new(cli.action, cli.key.as_deref(), cli.default.as_deref());
    let documents = load_documents(io::stdin(), mode)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = write_outputs(
        &mut out,
        run(documents, &query, &dumper),
        dumper.document_separator(),
        config.line_buffer,
    )?;
    out.flush()?;
    log::debug!("wrote {} output(s)", written);
    Ok(())
}
