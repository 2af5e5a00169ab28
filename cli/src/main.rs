mod report;
mod test_runner;

use std::path::Path;
use std::process;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use regimen::parser::{ParseError, ParseErrorKind, ParseOptions};
use regimen::registry::DuplicatePolicy;
use regimen::source::{SourceEncoding, read_source};
use tally::AggregateError;

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

/// Exit status when at least one line had a syntax error.
const EXIT_SYNTAX: i32 = 3;
/// Exit status when at least one line redefined a name.
const EXIT_DUPLICATE: i32 = 4;

#[derive(Parser)]
#[command(
    name = "regimen",
    version,
    about = "Calculate frequency of each regime in history"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count regimes over the history in a file
    Run(RunArgs),

    /// Run .test.regimen fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// File which contains history
    file: String,

    /// Set history file encoding
    #[arg(
        short,
        long,
        default_value = "utf-8",
        value_parser = encoding_parser()
    )]
    encoding: SourceEncoding,

    /// Let a later definition replace an earlier one with the same name
    #[arg(long)]
    allow_redefinition: bool,

    /// Parse only, don't count (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// List parsed regimes and blocks instead of counting
    #[arg(long)]
    list: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.regimen file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `regimen file.txt` works like `regimen run file.txt`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(first_pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&first_pos) {
            args.insert(1, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Run(run_args) => process::exit(do_run(run_args, cli.no_color)),
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

/// The first bare word on the command line, skipping the value of `-e`.
fn first_positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-e" | "--encoding" => {
                iter.next();
            }
            a if a.starts_with('-') => {}
            a => return Some(a),
        }
    }
    None
}

fn encoding_parser() -> impl TypedValueParser<Value = SourceEncoding> {
    PossibleValuesParser::new(SourceEncoding::LABELS.iter().copied())
        .try_map(|label| SourceEncoding::from_label(&label).ok_or("unknown encoding"))
}

fn do_run(args: RunArgs, no_color: bool) -> i32 {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let source = match read_source(&args.file, args.encoding) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            return 1;
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let options = ParseOptions {
        duplicates: if args.allow_redefinition {
            DuplicatePolicy::Replace
        } else {
            DuplicatePolicy::Reject
        },
    };
    let parsed = regimen::parser::Parser::new(source, file_id)
        .with_options(options)
        .parse();
    emit_parse_errors(&writer, &config, &files, &parsed.diagnostics);
    let parse_status = parse_exit_code(&parsed.diagnostics);

    if args.check {
        if parse_status == 0 {
            eprintln!("ok: {} parsed successfully", args.file);
        }
        return parse_status;
    }

    let mut stdout = std::io::stdout();

    if args.list {
        if let Err(e) = report::write_listing(&mut stdout, &parsed.catalog) {
            eprintln!("error: {}", e);
            return 1;
        }
        return parse_status;
    }

    match tally::summarize(&parsed.catalog) {
        Ok(totals) => {
            if let Err(e) = report::write_table(&mut stdout, &parsed.catalog, &totals) {
                eprintln!("error: {}", e);
                return 1;
            }
            parse_status
        }
        Err(error) => {
            emit_aggregate_error(&writer, &config, &files, &error);
            error.exit_code()
        }
    }
}

fn parse_exit_code(diagnostics: &[ParseError]) -> i32 {
    if diagnostics.iter().any(|d| d.kind == ParseErrorKind::Syntax) {
        EXIT_SYNTAX
    } else if diagnostics
        .iter()
        .any(|d| d.kind == ParseErrorKind::DuplicateName)
    {
        EXIT_DUPLICATE
    } else {
        0
    }
}

fn emit_parse_errors(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    errors: &[ParseError],
) {
    for error in errors {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    }
}

fn emit_aggregate_error(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    error: &AggregateError,
) {
    if let Some(span) = &error.span {
        let diagnostic = Diagnostic::new(Severity::Error)
            .with_message(error.to_string())
            .with_labels(vec![Label::primary(error.source_id, span.clone())])
            .with_notes(error.notes.clone());
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    } else {
        eprintln!("error: {}", error);
        for note in &error.notes {
            eprintln!("  = note: {}", note);
        }
    }
}
