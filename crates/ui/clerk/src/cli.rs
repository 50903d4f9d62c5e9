use clap::Parser;

use crate::config::{get_config_dir, get_data_dir};

/// Command line overrides. Anything not given here falls back to the config
/// file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "clerk", author, version = version(), about = "issuedesk terminal client")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FLOAT",
        help = "Tick rate, i.e. number of ticks per second"
    )]
    pub tick_rate: Option<f64>,

    #[arg(
        short,
        long,
        value_name = "FLOAT",
        help = "Frame rate, i.e. number of frames per second"
    )]
    pub frame_rate: Option<f64>,

    #[arg(short, long, value_name = "URL", help = "Tracker server base URL")]
    pub server: Option<String>,
}

const VERSION_MESSAGE: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION")
);

pub fn version() -> String {
    let author = clap::crate_authors!();

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
