use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use compile_command_core::{CompileCommand, Consume, DriverMode, print_argv};
use compile_command_db::{CompilationDatabase, EditConfig};
use compile_command_mangle::{ArgEdits, ArgStripper, CommandMangler, StripRule};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// How mangled commands are printed.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One shell-quoted command line.
    Argv,
    /// The command as a JSON object.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "compile-command", version)]
#[command(about = "Strip and rewrite compiler command lines for tooling")]
struct Cli {
    /// Log debug output to stderr. Otherwise RUST_LOG applies, default warn.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Remove options, with their aliases and values, from a command line.
    Strip(StripArgs),
    /// Rewrite a command line so it compiles exactly one file.
    Mangle(MangleArgs),
    /// Rewrite the commands of a compile_commands.json database.
    MangleDb(MangleDbArgs),
    /// Show the matching rules an option spelling expands to.
    Options(OptionsArgs),
}

#[derive(Debug, Args)]
struct StripArgs {
    /// Option spelling to remove; repeatable. A trailing `*` matches any suffix.
    #[arg(long, short, required = true, allow_hyphen_values = true)]
    remove: Vec<String>,
    /// Command line, program name first.
    #[arg(last = true, required = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct ManglerArgs {
    /// Compiler generic driver names are resolved next to.
    #[arg(long)]
    clang_path: Option<String>,
    /// Resource directory added unless the command sets one.
    #[arg(long)]
    resource_dir: Option<String>,
    /// Sysroot added unless the command sets one.
    #[arg(long)]
    sysroot: Option<String>,
    /// Target used when the program name implies none.
    #[arg(long)]
    target: Option<String>,
    /// Fill unset toolchain paths from the installed compiler.
    #[arg(long)]
    detect: bool,
    /// YAML file of compile-flag edits.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MangleArgs {
    /// File the command should compile.
    #[arg(long)]
    file: String,
    #[command(flatten)]
    mangler: ManglerArgs,
    /// Output format.
    #[arg(long, default_value = "argv")]
    format: OutputFormat,
    /// Command line, program name first.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct MangleDbArgs {
    /// Path to compile_commands.json, or the directory holding it.
    #[arg(long)]
    compile_commands: PathBuf,
    /// Files to produce commands for; repeatable. Defaults to every entry.
    #[arg(long)]
    file: Vec<String>,
    #[command(flatten)]
    mangler: ManglerArgs,
    /// Number of parallel jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct OptionsArgs {
    /// Option spelling, e.g. -I or --language=.
    #[arg(allow_hyphen_values = true)]
    spelling: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Strip(args) => run_strip(args),
        Command::Mangle(args) => run_mangle(args),
        Command::MangleDb(args) => run_mangle_db(args),
        Command::Options(args) => run_options(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_strip(args: StripArgs) -> Result<(), String> {
    let mut stripper = ArgStripper::new();
    for spelling in &args.remove {
        stripper.strip(spelling);
    }
    let mut argv = args.args;
    stripper.process(&mut argv);
    println!("{}", print_argv(&argv));
    Ok(())
}

impl ManglerArgs {
    fn build(&self) -> Result<(CommandMangler, EditConfig), String> {
        let mut mangler = if self.detect {
            CommandMangler::detect()
        } else {
            CommandMangler::new()
        };
        let overrides = [
            (&mut mangler.clang_path, &self.clang_path),
            (&mut mangler.resource_dir, &self.resource_dir),
            (&mut mangler.sysroot, &self.sysroot),
            (&mut mangler.target, &self.target),
        ];
        for (field, value) in overrides {
            if value.is_some() {
                field.clone_from(value);
            }
        }

        let config = match &self.config {
            Some(path) => EditConfig::load(path)
                .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?,
            None => EditConfig::default(),
        };
        debug!(mangler = ?mangler, fragments = config.len(), "Configured mangler");
        Ok((mangler, config))
    }
}

fn run_mangle(args: MangleArgs) -> Result<(), String> {
    let (mangler, config) = args.mangler.build()?;
    let mut command = CompileCommand::new(".", &args.file, args.args);
    mangler.mangle(&mut command, &args.file, &config.edits_for(&args.file));

    match args.format {
        OutputFormat::Argv => println!("{}", print_argv(&command.command_line)),
        OutputFormat::Json => {
            let raw = serde_json::to_string_pretty(&command)
                .map_err(|err| format!("Failed to serialize command: {err}"))?;
            println!("{raw}");
        }
    }
    Ok(())
}

fn run_mangle_db(args: MangleDbArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let (mangler, config) = args.mangler.build()?;
    let path = &args.compile_commands;
    let db = if path.is_dir() {
        CompilationDatabase::from_dir(path)
    } else {
        CompilationDatabase::from_file(path)
    }
    .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;

    // (command, file it is mangled for)
    let work: Vec<(CompileCommand, String)> = if args.file.is_empty() {
        db.entries()
            .iter()
            .map(|entry| (entry.clone(), entry.filename.clone()))
            .collect()
    } else {
        args.file
            .iter()
            .map(|file| {
                db.command_for(file)
                    .map(|command| (command, file.clone()))
                    .map_err(|err| err.to_string())
            })
            .collect::<Result<_, _>>()?
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let commands: Vec<CompileCommand> = pool.install(|| {
        work.into_par_iter()
            .map(|(mut command, file)| {
                let edits: ArgEdits = config.edits_for(&file);
                mangler.mangle(&mut command, &file, &edits);
                command
            })
            .collect()
    });

    let raw = serde_json::to_string_pretty(&commands)
        .map_err(|err| format!("Failed to serialize commands: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_options(args: OptionsArgs) -> Result<(), String> {
    let mut stripper = ArgStripper::new();
    stripper.strip(&args.spelling);
    for rule in stripper.rules() {
        println!("{}", describe_rule(rule));
    }
    Ok(())
}

fn describe_rule(rule: &StripRule) -> String {
    let matching = if rule.exact { "exact" } else { "prefix" };
    let consume = match rule.consume {
        Consume::Tokens(n) => n.to_string(),
        Consume::Rest => "rest".to_string(),
        Consume::Never => "never".to_string(),
    };
    let modes: Vec<&str> = rule
        .modes
        .modes()
        .map(|mode| match mode {
            DriverMode::Gcc => "gcc",
            DriverMode::Cl => "cl",
            DriverMode::Cc1 => "cc1",
        })
        .collect();
    format!(
        "{:<24} {:<6} consume={:<5} modes={}",
        rule.text,
        matching,
        consume,
        modes.join(",")
    )
}
