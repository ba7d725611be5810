use anyhow::{Context, Result};
use ppipeline::cli::commands::{DemoCommand, ThreadsCommand};
use ppipeline::cli::demo::{self, Value};
use ppipeline::cli::output::*;
use ppipeline::cli::{Cli, Command};
use ppipeline::execution::{host_parallelism, ThreadCount};
use ppipeline::EngineConfig;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = load_config(&cli)?;

    match &cli.command {
        Command::Demo(cmd) => run_demo(cmd, &config)?,
        Command::Threads(cmd) => show_threads(cmd)?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load engine config from {}", path))?,
        None => EngineConfig::default(),
    };
    let config = config
        .with_env_override()
        .context("Invalid thread count in environment")?;
    debug!("Engine config: {:?}", config);
    Ok(config)
}

fn run_demo(cmd: &DemoCommand, config: &EngineConfig) -> Result<()> {
    let thread_count = cmd
        .threads
        .or(config.thread_count)
        .unwrap_or_default();
    let pipeline = demo::number_pipeline(thread_count).context("Failed to build pipeline")?;

    if !cmd.json {
        println!(
            "{} Running {} with {} worker(s) on seed {}",
            ROCKET,
            style(config.name.as_deref().unwrap_or("number pipeline")).bold(),
            style(pipeline.thread_count()).cyan(),
            style(cmd.seed).cyan()
        );
    }

    let mut stream = pipeline
        .run(Value::Number(cmd.seed))
        .context("Failed to start pipeline")?;

    let mut results = Vec::new();
    for result in stream.by_ref() {
        match result {
            Ok(Value::Number(n)) => results.push(n),
            Ok(other) => anyhow::bail!("Pipeline produced a non-numeric value: {:?}", other),
            Err(e) => {
                if !cmd.json {
                    println!("{} {}", CROSS, style("Pipeline failed").red());
                }
                return Err(e).context("Step failed");
            }
        }
    }
    results.sort_unstable();
    let stats = stream.stats();

    if cmd.json {
        let data = serde_json::json!({
            "seed": cmd.seed,
            "thread_count": pipeline.thread_count(),
            "run_id": stream.run_id().to_string(),
            "results": results,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{} Results: {}", CHECK, style(format_results(&results, 50)).green());
        println!("{} {}", INFO, format_stats(&stats));
    }

    Ok(())
}

fn show_threads(cmd: &ThreadsCommand) -> Result<()> {
    let setting = ThreadCount::parse_setting(&cmd.value)
        .with_context(|| format!("Cannot parse thread count '{}'", cmd.value))?;
    let resolved = setting.resolve().context("Cannot resolve thread count")?;

    println!(
        "{} {} -> {} worker(s) ({} processing unit(s) available)",
        INFO,
        style(setting).bold(),
        style(resolved).cyan(),
        host_parallelism()
    );

    Ok(())
}
