use clap::Parser;
use hearth_cli::commands::{cli, data, sync, OutputFormat};
use hearth_cli::context::AppContext;
use hearth_core::api as core_api;
use hearth_core::api::CliError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = core_api::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    let format = OutputFormat::parse(&args.format)?;
    let ctx = AppContext::new(cfg).await?;

    dispatch(args.command, format, &ctx).await?;
    Ok(0)
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: command / IO error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Io(_) => 20,
        CliError::Command(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(
    cmd: cli::Commands,
    format: OutputFormat,
    ctx: &AppContext,
) -> Result<(), CliError> {
    match cmd {
        cli::Commands::Init(init_args) => data::handle_init(init_args, ctx).await,
        cli::Commands::Show => data::handle_show(format, ctx).await,
        cli::Commands::Summary => data::handle_summary(format, ctx).await,
        cli::Commands::Status => sync::handle_status(format, ctx).await,
        cli::Commands::Sync => sync::handle_sync(ctx).await,
        cli::Commands::Pull => sync::handle_pull(ctx).await,
        cli::Commands::Login(login_args) => sync::handle_login(login_args, ctx).await,
        cli::Commands::Logout => sync::handle_logout(ctx).await,
        cli::Commands::Member { command } => data::handle_member(command, ctx).await,
        cli::Commands::Account { command } => data::handle_account(command, ctx).await,
        cli::Commands::Goal { command } => data::handle_goal(command, ctx).await,
        cli::Commands::Outgoing { command } => data::handle_outgoing(command, ctx).await,
        cli::Commands::Investment { command } => data::handle_investment(command, ctx).await,
        cli::Commands::Mortgage { command } => data::handle_mortgage(command, ctx).await,
        cli::Commands::Category { command } => data::handle_category(command, ctx).await,
    }
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("hearth"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let appender = tracing_appender::rolling::daily(dir, "hearth.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
