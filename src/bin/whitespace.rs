use esolang_vm::io::StdIo;
use esolang_vm::whitespace::{self, Halt};
use log::info;
use std::env;
use std::fs;

struct Args {
    path: String,
    max_steps: Option<u64>,
    stack_cap: Option<i64>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut path = None;
    let mut max_steps = None;
    let mut stack_cap = None;
    let mut verbosity = 0u8;

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--max-steps" => {
                let value = iter.next().ok_or("--max-steps needs a value")?;
                max_steps = Some(value.parse().map_err(|_| "--max-steps must be an integer")?);
            }
            "--stack-cap" => {
                let value = iter.next().ok_or("--stack-cap needs a value")?;
                stack_cap = Some(match value.as_str() {
                    "default" => whitespace::DEFAULT_STACK_CAP,
                    n => n.parse().map_err(|_| "--stack-cap must be an integer or `default`")?,
                });
            }
            "-v" => verbosity = verbosity.max(1),
            "-vv" => verbosity = verbosity.max(2),
            "--trace" => verbosity = verbosity.max(3),
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(format!("unrecognized argument: {other}")),
        }
    }

    init_logging(verbosity);
    let path = path.ok_or(
        "usage: whitespace <file.ws> [--max-steps N] [--stack-cap N|default] [-v|-vv|--trace]",
    )?;
    Ok(Args { path, max_steps, stack_cap })
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), String> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let source = fs::read(&args.path).map_err(|e| format!("failed to read {}: {e}", args.path))?;
    let program = whitespace::load(&source).map_err(|e| e.to_string())?;
    info!("loaded {} tokens from {}", program.len(), args.path);

    let mut machine = match args.stack_cap {
        Some(cap) => whitespace::Machine::with_stack_cap(&program, cap),
        None => whitespace::Machine::new(&program),
    };
    let mut io = StdIo;
    let halt = machine.run(&mut io, args.max_steps).map_err(|e| e.to_string())?;
    info!("halted after {} steps: {halt:?}", machine.step_count());

    if matches!(halt, Halt::StepCapExceeded) {
        return Err("execution stopped: step cap exceeded".to_string());
    }
    Ok(())
}
