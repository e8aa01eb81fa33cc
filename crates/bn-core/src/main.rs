//! bn-core - exact inference on discrete Bayesian networks.
//!
//! The binary reads a BIF network (or the built-in five-variable example),
//! orders it topologically and prints the marginal of every variable given
//! optional evidence.

use bn_common::{format_error_human, OutputFormat, StructuredError, SCHEMA_VERSION};
use bn_config::{CyclePolicy, LookupPolicy};
use bn_core::bif;
use bn_core::config::{load_config, ResolvedConfig};
use bn_core::evidence::Evidence;
use bn_core::exit_codes::ExitCode;
use bn_core::graph::{reindex, topological_order};
use bn_core::inference::{infer, InferenceOptions};
use bn_core::log_event;
use bn_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogLevel, Stage,
};
use bn_core::network::{validate_network, Network};
use bn_core::output::{render, CheckReport, InferReport, Render, ShowReport};
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Exact Bayesian network inference by joint enumeration
#[derive(Parser)]
#[command(name = "bn-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to engine.json (overrides BN_ENGINE_CONFIG and the XDG lookup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the marginal of every variable given evidence (default)
    Infer(InferArgs),

    /// Print the parsed network, its adjacency and topological order
    Show(NetworkArgs),

    /// Validate a network's structure and CPTs
    Check(NetworkArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug, Default)]
struct NetworkArgs {
    /// BIF file to read (defaults to the built-in gradient network)
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Override the configured cycle policy (reject, warn)
    #[arg(long)]
    cycle_policy: Option<CyclePolicy>,
}

#[derive(Args, Debug, Default)]
struct InferArgs {
    #[command(flatten)]
    network: NetworkArgs,

    /// Evidence as comma-separated NAME=VALUE pairs, e.g. "a=true,c=false"
    #[arg(short, long, default_value = "")]
    evidence: String,

    /// Only report this variable's marginal
    #[arg(short, long)]
    query: Option<String>,

    /// Override the configured lookup policy (strict, lenient)
    #[arg(long)]
    lookup_policy: Option<LookupPolicy>,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet || cli.global.verbose > 0 {
        Some(LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet))
    } else {
        None
    };
    let log_config = LogConfig::from_env(cli_level, None).with_ansi(!cli.global.no_color);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());

    let outcome = match cli.command {
        None => run_infer(&cli.global, &InferArgs::default(), ctx.clone()),
        Some(Commands::Infer(args)) => run_infer(&cli.global, &args, ctx.clone()),
        Some(Commands::Show(args)) => run_show(&cli.global, &args, ctx.clone()),
        Some(Commands::Check(args)) => run_check(&cli.global, &args, ctx.clone()),
        Some(Commands::Version) => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(err) => report_error(&cli.global, &ctx, &err),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Render,
        "run finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_infer(
    global: &GlobalOpts,
    args: &InferArgs,
    ctx: LogContext,
) -> bn_common::Result<ExitCode> {
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "starting inference");

    let config = load_engine_config(global, &ctx)?;
    let evidence = Evidence::parse(&args.evidence)?;

    let network = load_network(&args.network, &ctx)?;
    let ctx = match network.name() {
        Some(name) => ctx.with_network(name),
        None => ctx,
    };

    let cycle_policy = args.network.cycle_policy.unwrap_or(config.engine.cycle_policy);
    let order = topological_order(&network, cycle_policy)?;
    log_event!(
        ctx,
        DEBUG,
        event_names::SORT_FINISHED,
        Stage::Sort,
        "topological order computed",
        variables = order.len()
    );
    let sorted = reindex(&network, &order)?;
    log_event!(ctx, DEBUG, event_names::REINDEX_FINISHED, Stage::Reindex, "network reindexed");

    if let Some(query) = args.query.as_deref() {
        if sorted.id_of(query).is_none() {
            return Err(bn_common::Error::UnknownQueryVariable {
                variable: query.to_string(),
            });
        }
    }

    let mut options = InferenceOptions::from(&config.engine);
    if let Some(policy) = args.lookup_policy {
        options.lookup_policy = policy;
    }
    log_event!(
        ctx,
        DEBUG,
        event_names::INFER_STARTED,
        Stage::Infer,
        "enumerating joint distribution",
        evidence = tracing::field::display(&evidence)
    );
    let result = infer(&sorted, &evidence, &options)?;

    let exit_code = if result.is_degenerate() {
        log_event!(
            ctx,
            WARN,
            event_names::INFER_ZERO_EVIDENCE,
            Stage::Infer,
            "evidence has zero probability",
            evidence = tracing::field::display(&evidence)
        );
        ExitCode::ZeroEvidence
    } else {
        ExitCode::Clean
    };
    log_event!(
        ctx,
        INFO,
        event_names::INFER_FINISHED,
        Stage::Infer,
        "inference finished",
        joint_states = result.joint_states,
        evidence_probability = result.evidence_probability
    );

    let report = InferReport::new(
        ctx.run_id.clone(),
        sorted.name(),
        &result,
        args.query.as_deref(),
        config.engine.sum_tolerance,
    )?;
    print_report(&report, global.format)?;
    Ok(exit_code)
}

fn run_show(
    global: &GlobalOpts,
    args: &NetworkArgs,
    ctx: LogContext,
) -> bn_common::Result<ExitCode> {
    let config = load_engine_config(global, &ctx)?;
    let network = load_network(args, &ctx)?;
    let policy = args.cycle_policy.unwrap_or(config.engine.cycle_policy);
    let order = topological_order(&network, policy)?;
    let sorted = reindex(&network, &order)?;
    print_report(&ShowReport::new(&network, &order, &sorted), global.format)?;
    Ok(ExitCode::Clean)
}

fn run_check(
    global: &GlobalOpts,
    args: &NetworkArgs,
    ctx: LogContext,
) -> bn_common::Result<ExitCode> {
    let config = load_engine_config(global, &ctx)?;
    let network = load_network(args, &ctx)?;
    let cycle = topological_order(&network, CyclePolicy::Reject)
        .err()
        .map(|e| e.to_string());
    let validation = validate_network(&network, config.engine.cpt_row_tolerance);
    let report = CheckReport::new(&network, validation, cycle);
    print_report(&report, global.format)?;

    Ok(if report.cycle.is_some() {
        ExitCode::StructureError
    } else if !report.clean {
        ExitCode::InputError
    } else {
        ExitCode::Clean
    })
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "bn_core_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{:#}", version_info);
        }
        _ => {
            println!("bn-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load_engine_config(global: &GlobalOpts, ctx: &LogContext) -> bn_common::Result<ResolvedConfig> {
    match load_config(global.config.as_deref()) {
        Ok(config) => {
            match &config.path {
                Some(path) => log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_LOADED,
                    Stage::Init,
                    "engine config loaded",
                    path = tracing::field::display(path.display()),
                    source = tracing::field::display(&config.source)
                ),
                None => log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_DEFAULT_USED,
                    Stage::Init,
                    "using built-in engine defaults"
                ),
            }
            Ok(config)
        }
        Err(err) => {
            log_event!(
                ctx,
                DEBUG,
                event_names::CONFIG_ERROR,
                Stage::Init,
                "engine config rejected",
                error = tracing::field::display(&err)
            );
            Err(err.into())
        }
    }
}

fn load_network(args: &NetworkArgs, ctx: &LogContext) -> bn_common::Result<Network> {
    log_event!(ctx, DEBUG, event_names::PARSE_STARTED, Stage::Parse, "reading network");
    let network = match &args.file {
        Some(path) => bif::load_bif(path)?,
        None => {
            log_event!(
                ctx,
                INFO,
                event_names::PARSE_STARTED,
                Stage::Parse,
                "no BIF file given, using the built-in gradient network"
            );
            bif::parse_bif(bif::GRADIENT_BIF)?
        }
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::PARSE_FINISHED,
        Stage::Parse,
        "network parsed",
        variables = network.len()
    );
    Ok(network)
}

fn print_report<R: Render>(report: &R, format: OutputFormat) -> bn_common::Result<()> {
    let text = render(report, format)?;
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
    Ok(())
}

fn report_error(global: &GlobalOpts, ctx: &LogContext, err: &bn_common::Error) -> ExitCode {
    let exit_code = ExitCode::from(err);
    if exit_code.is_internal_error() {
        log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Render,
            "internal error",
            error = tracing::field::display(&err)
        );
    }

    match global.format {
        OutputFormat::Json => {
            let structured = StructuredError::from(err)
                .with_context("run_id", &ctx.run_id)
                .with_context("exit_code", exit_code.code_name());
            eprintln!("{}", structured.to_json_pretty());
        }
        _ => {
            let use_color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, use_color));
        }
    }
    exit_code
}
