use esolang_vm::io::StdIo;
use esolang_vm::piet::{self, Halt, UnknownColorPolicy};
use log::info;
use std::env;

struct Args {
    path: String,
    codel_size: Option<u32>,
    policy: UnknownColorPolicy,
    max_steps: Option<u64>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut path = None;
    let mut codel_size = None;
    let mut policy = UnknownColorPolicy::Strict;
    let mut max_steps = None;
    let mut verbosity = 0u8;

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--codel-size" => {
                let value = iter.next().ok_or("--codel-size needs a value")?;
                codel_size = if value == "auto" {
                    None
                } else {
                    Some(value.parse().map_err(|_| "--codel-size must be an integer or \"auto\"")?)
                };
            }
            "--unknown-color" => {
                let value = iter.next().ok_or("--unknown-color needs a value")?;
                policy = match value.as_str() {
                    "strict" => UnknownColorPolicy::Strict,
                    "white" => UnknownColorPolicy::TreatAsWhite,
                    "black" => UnknownColorPolicy::TreatAsBlack,
                    _ => return Err("--unknown-color must be strict, white, or black".to_string()),
                };
            }
            "--max-steps" => {
                let value = iter.next().ok_or("--max-steps needs a value")?;
                max_steps = Some(value.parse().map_err(|_| "--max-steps must be an integer")?);
            }
            "-v" => verbosity = verbosity.max(1),
            "-vv" => verbosity = verbosity.max(2),
            "--trace" => verbosity = verbosity.max(3),
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(format!("unrecognized argument: {other}")),
        }
    }

    init_logging(verbosity);
    let path = path.ok_or("usage: piet <file.png> [--codel-size N|auto] [--unknown-color strict|white|black] [--max-steps N] [-v|-vv|--trace]")?;
    Ok(Args { path, codel_size, policy, max_steps })
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

    let grid = piet::load(&args.path, args.codel_size, args.policy).map_err(|e| e.to_string())?;
    info!("loaded {}x{} grid from {}", grid.width(), grid.height(), args.path);

    let mut machine = piet::Machine::new(&grid);
    let mut io = StdIo;
    let halt = machine.run(&mut io, args.max_steps);
    info!("halted after {} steps: {halt:?}", machine.step_count());

    if matches!(halt, Halt::StepCapExceeded) {
        return Err("execution stopped: step cap exceeded".to_string());
    }
    Ok(())
}
