use clap::Parser;

/// Forwarding HTTP proxy that censors words in text responses and caches
/// what it relays.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to listen on (overrides `global.listen`)
    pub port: Option<u16>,

    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", default_value = "hush.toml")]
    pub config: String,

    /// Word list, one word per line (overrides `censor.word_file`)
    #[arg(long, value_name = "FILE")]
    pub censor_file: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
