// jdbtrace: record and browse execution traces of Java programs through jdb

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use jdbtrace::config::TraceConfig;
use jdbtrace::session::{jdb_version, ClassPath};
use jdbtrace::tracer::{TraceRequest, Tracer};
use jdbtrace::ui::{App, SourceCache};

/// Parsed command line
struct Options {
    request: TraceRequest,
    vars: bool,
    unique: bool,
    json: bool,
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} <Class> [options] [-- program args...]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --path DIR         directory holding the sources (default: current)");
    eprintln!("  --classpath CP     additional class path");
    eprintln!("  --vars             print the value history of every variable as JSON");
    eprintln!("  --unique           with --vars, keep only distinct values");
    eprintln!("  --stdin TEXT       line written to the program's standard input");
    eprintln!("  --json             print the full trace as JSON instead of opening the viewer");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  JDBTRACE_LOG       log level (error, warn, info, debug, trace)");
    eprintln!("  JDBTRACE_JDB, JDBTRACE_JAVA, JDBTRACE_JAVAC, JDBTRACE_PORT,");
    eprintln!("  JDBTRACE_TIMEOUT_SECS, JDBTRACE_NO_COMPILE");
}

fn flag_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut class_name = None;
    let mut path = None;
    let mut class_path = None;
    let mut stdin_text = None;
    let mut program_args = Vec::new();
    let (mut vars, mut unique, mut json) = (false, false, false);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--path" => path = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--classpath" | "-cp" => {
                class_path = Some(ClassPath::Joined(flag_value(&mut iter, arg)?))
            }
            "--stdin" => stdin_text = Some(flag_value(&mut iter, arg)?),
            "--vars" => vars = true,
            "--unique" => unique = true,
            "--json" => json = true,
            "--" => {
                program_args.extend(iter.by_ref().cloned());
                break;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            name if class_name.is_none() => class_name = Some(name.to_string()),
            extra => program_args.push(extra.to_string()),
        }
    }

    let class_name = class_name.ok_or_else(|| "no class name provided".to_string())?;
    Ok(Options {
        request: TraceRequest {
            class_name,
            path,
            class_path,
            args: program_args,
            stdin_text,
        },
        vars,
        unique,
        json,
    })
}

fn init_logging() {
    let level = std::env::var("JDBTRACE_LOG")
        .ok()
        .and_then(|value| tracing::Level::from_str(&value).ok())
        .unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("jdbtrace");

    let options = match parse_args(args.get(1..).unwrap_or(&[])) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            usage(program_name);
            std::process::exit(1);
        }
    };

    init_logging();

    let config = TraceConfig::from_env();
    match jdb_version(&config) {
        Some(version) => eprintln!("Using jdb {}", version),
        None => {
            eprintln!("Error: cannot run '{}'; is a JDK installed and on PATH?", config.jdb);
            std::process::exit(1);
        }
    }

    let tracer = Tracer::new(config);
    let request = &options.request;

    if options.vars {
        let history = tracer.variable_history(request, options.unique)?;
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    eprintln!("Tracing {}...", request.class_name);
    let trace = tracer.program_trace(request)?;
    eprintln!(
        "Recorded {} step(s){}",
        trace.steps.len(),
        if trace.exception_occurred {
            ", ended with an exception"
        } else {
            ""
        }
    );

    if options.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    let source_root = match &request.path {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(trace, SourceCache::new(source_root));
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
