use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use clap::{Parser as ClapParser, Subcommand};
use log::info;
use termcolor::{ColorChoice, StandardStream};
use wxf::encoding::magic::HEADER;
use wxf::{DecodeOptions, PrettyExpr, decode_with, tokenize};
use wxfform::{Fragment, Substitutions, Template, TemplateError};

mod logger;

#[derive(ClapParser)]
#[command(about = "Inspect WXF files and compile templates into WXF")]
pub struct Arguments {
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the tokens of a WXF file, one per line with its byte offset
    Tokens {
        /// Path to the WXF file
        input: PathBuf,
    },
    /// Pretty-print the expression stored in a WXF file
    Tree {
        /// Path to the WXF file
        input: PathBuf,
        /// Line width, the terminal width by default
        #[arg(long)]
        width: Option<usize>,
        /// Maximum nesting depth accepted while decoding
        #[arg(long, default_value_t = 1024)]
        max_depth: usize,
    },
    /// Compile a template file into WXF
    Compile {
        /// Path to the template source
        template: PathBuf,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
        /// Do not write the `8:` header
        #[arg(long)]
        no_header: bool,
        /// Substitute `#NAME` with the expression stored in a WXF file, as `NAME=FILE`
        #[arg(long = "bind", value_name = "NAME=FILE")]
        bindings: Vec<String>,
    },
}

fn read(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

fn tokens(input: &Path) -> Result<(), String> {
    let buffer = read(input)?;
    let tokens = tokenize(&buffer).map_err(|e| e.to_string())?;

    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut stdout = stdout.lock();
    for token in &tokens {
        writeln!(stdout, "{:>8}  {token}", token.offset()).map_err(|e| e.to_string())?;
    }
    info!("{} token(s) in {}", tokens.len(), input.display());
    Ok(())
}

fn tree(input: &Path, width: Option<usize>, max_depth: usize) -> Result<(), String> {
    let buffer = read(input)?;
    let options = DecodeOptions::new().max_depth(max_depth);
    let tree = decode_with(&buffer, &options).map_err(|e| e.to_string())?;

    let printed = match width {
        Some(width) => {
            let stdout = StandardStream::stdout(ColorChoice::Auto);
            let mut stdout = stdout.lock();
            tree.pretty_render_to(width, &mut stdout)
                .and_then(|_| writeln!(stdout))
        }
        None => tree.pretty_print(),
    };
    printed.map_err(|e| e.to_string())
}

fn load_bindings(bindings: &[String]) -> Result<Substitutions<'static>, String> {
    let mut subs = Substitutions::new();
    for binding in bindings {
        let (name, path) = binding
            .split_once('=')
            .ok_or_else(|| format!("binding `{binding}` is not of the form NAME=FILE"))?;
        let bytes = read(Path::new(path))?;
        let body = bytes.strip_prefix(&HEADER).unwrap_or(&bytes).to_vec();
        subs.insert(name.trim_start_matches('#').to_string(), Fragment::Bytes(body));
    }
    Ok(subs)
}

fn report_parse_errors(file: &str, source: &str, error: &TemplateError) {
    let TemplateError::Parse { errors } = error else {
        eprintln!("Error: {error}");
        return;
    };

    let mut colors = ColorGenerator::new();
    let a = colors.next();

    for diagnostic in errors {
        let span = (file.to_string(), diagnostic.span.clone());
        let printed = Report::build(ReportKind::Error, span.clone())
            .with_message(&diagnostic.message)
            .with_label(
                Label::new(span)
                    .with_message("The error occurred here")
                    .with_color(a),
            )
            .finish()
            .eprint((file.to_string(), Source::from(source)));
        if printed.is_err() {
            eprintln!("Error: {}", diagnostic.message);
        }
    }
}

fn compile(
    template: &Path,
    output: &Path,
    no_header: bool,
    bindings: &[String],
) -> Result<(), String> {
    let file = template.display().to_string();
    let source = std::fs::read_to_string(template)
        .map_err(|e| format!("cannot read {file}: {e}"))?;

    let template = match Template::parse(&source) {
        Ok(template) => template,
        Err(error) => {
            report_parse_errors(&file, &source, &error);
            return Err(format!("failed to parse template {file}"));
        }
    };

    let subs = load_bindings(bindings)?;
    let encoder = template
        .compile(&subs, !no_header)
        .map_err(|e| e.to_string())?;

    std::fs::write(output, encoder.as_bytes())
        .map_err(|e| format!("cannot write {}: {e}", output.display()))?;
    info!("wrote {} byte(s) to {}", encoder.len(), output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    logger::init(logger::level_from_verbosity(args.verbose));

    let result = match &args.command {
        Command::Tokens { input } => tokens(input),
        Command::Tree {
            input,
            width,
            max_depth,
        } => tree(input, *width, *max_depth),
        Command::Compile {
            template,
            output,
            no_header,
            bindings,
        } => compile(template, output, *no_header, bindings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
