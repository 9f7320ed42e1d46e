use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use easel_core::{Sketch, SketchOptions, VarValue};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the drawing script
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Output file (png, svg, pdf or ps). Defaults to the script name with .png
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Override a script variable, e.g. --var size=40
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Render this many frames to numbered files
    #[arg(long, value_name = "N")]
    frames: Option<u32>,

    /// Letterbox the output into WIDTHxHEIGHT pixels
    #[arg(long, value_name = "WxH", value_parser = parse_fit)]
    fit: Option<(u32, u32)>,

    /// Print the declared variables as JSON instead of rendering
    #[arg(long)]
    list_vars: bool,

    /// Re-render whenever the script changes
    #[arg(long)]
    watch: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn parse_fit(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", raw))?;
    let w = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((w, h))
}

fn parse_var(raw: &str) -> anyhow::Result<(String, VarValue)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("variable override '{}' is not NAME=VALUE", raw))?;
    Ok((name.trim().to_string(), VarValue::parse(value.trim())))
}

fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
}

fn render(sketch: &mut Sketch, frames: Option<u32>, output: &Path) -> anyhow::Result<()> {
    match frames {
        Some(n) if n > 1 => {
            let written = sketch.render_frames(n, output)?;
            info!(count = written.len(), "Render complete");
        }
        _ => {
            sketch.render(output)?;
            info!(path = %output.display(), "Render complete");
        }
    }
    Ok(())
}

/// Whether a watch event touches the script itself.
fn is_event_relevant(event: &notify::Event, script: &Path) -> bool {
    let touches_script = event
        .paths
        .iter()
        .any(|p| p.file_name().is_some() && p.file_name() == script.file_name());
    if !touches_script {
        return false;
    }
    match &event.kind {
        notify::EventKind::Any => true,
        notify::EventKind::Access(_) => false,
        notify::EventKind::Create(_) => true,
        notify::EventKind::Modify(kind) => !matches!(
            kind,
            notify::event::ModifyKind::Metadata(_) | notify::event::ModifyKind::Other
        ),
        notify::EventKind::Remove(_) => false,
        notify::EventKind::Other => false,
    }
}

fn watch(sketch: &mut Sketch, script: &Path, frames: Option<u32>, output: &Path) -> anyhow::Result<()> {
    if let Err(e) = render(sketch, frames, output) {
        error!("{:#}", e);
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = RecommendedWatcher::new(tx, notify::Config::default())
        .context("failed to set up file watching")?;
    let dir = match script.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    info!(script = %script.display(), "Watching for changes");

    let timeout = Duration::from_millis(100);
    loop {
        let mut rerun = false;
        for event in rx
            .recv()
            .into_iter()
            .chain(std::iter::from_fn(|| rx.recv_timeout(timeout).ok()))
        {
            match event {
                Ok(event) => rerun |= is_event_relevant(&event, script),
                Err(e) => warn!(error = %e, "Watch error"),
            }
        }
        if !rerun {
            continue;
        }
        let result = sketch
            .reload()
            .map_err(anyhow::Error::from)
            .and_then(|_| render(sketch, frames, output));
        if let Err(e) = result {
            error!("{:#}", e);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = cli
        .vars
        .iter()
        .map(|raw| parse_var(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut sketch = Sketch::from_file(&cli.script)
        .with_context(|| format!("cannot read {}", cli.script.display()))?
        .with_options(SketchOptions {
            fit: cli.fit,
            ..SketchOptions::default()
        })
        .with_variables(overrides);

    if cli.list_vars {
        let outcome = sketch.run()?;
        println!("{}", serde_json::to_string_pretty(outcome.variables())?);
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.script.with_extension("png"));
    info!(script = %cli.script.display(), output = %output.display(), "Running sketch");

    if cli.watch {
        return watch(&mut sketch, &cli.script, cli.frames, &output);
    }
    render(&mut sketch, cli.frames, &output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_parses_width_and_height() {
        assert_eq!(parse_fit("640x480"), Ok((640, 480)));
        assert_eq!(parse_fit("10X20"), Ok((10, 20)));
        assert!(parse_fit("640").is_err());
        assert!(parse_fit("ax1").is_err());
    }

    #[test]
    fn var_overrides_are_typed() {
        let (name, value) = parse_var("size=40").unwrap();
        assert_eq!(name, "size");
        assert_eq!(value, VarValue::Number(40.0));
        assert_eq!(parse_var("on=true").unwrap().1, VarValue::Boolean(true));
        assert!(parse_var("novalue").is_err());
    }

    #[test]
    fn cli_accepts_repeated_vars() {
        let cli = Cli::try_parse_from([
            "easel", "a.rhai", "out.svg", "--var", "a=1", "--var", "b=x", "--fit", "100x50",
        ])
        .unwrap();
        assert_eq!(cli.vars.len(), 2);
        assert_eq!(cli.fit, Some((100, 50)));
        assert_eq!(cli.output, Some(PathBuf::from("out.svg")));
    }
}
