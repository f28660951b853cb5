use std::env;
use std::path::PathBuf;
use std::process;

use log::error;

use led_ticker::app::{self, Options};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("Usage: led-ticker [--width N] [--height N] [--config PATH] [--layouts DIR]");
            process::exit(2);
        }
    };

    if let Err(err) = app::run(&options) {
        error!("{err}");
        process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--width" => options.width = number(&flag, args.next())?,
            "--height" => options.height = number(&flag, args.next())?,
            "--config" => options.config_path = PathBuf::from(value(&flag, args.next())?),
            "--layouts" => options.layout_dir = PathBuf::from(value(&flag, args.next())?),
            other => return Err(format!("unknown flag `{other}`")),
        }
    }

    Ok(options)
}

fn value(flag: &str, arg: Option<String>) -> Result<String, String> {
    arg.ok_or_else(|| format!("{flag} requires a value"))
}

fn number(flag: &str, arg: Option<String>) -> Result<u32, String> {
    value(flag, arg)?
        .parse()
        .map_err(|_| format!("{flag} requires a number"))
}
