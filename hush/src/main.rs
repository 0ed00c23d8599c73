use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hush_config::HushConfig;
use hush_core::master::Master;
use hush_http::CensorList;
use hush_proxy::Proxy;
use tracing::warn;
use utils::init_tracing;

mod args;

use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg = HushConfig::from_file_or_default(&args.config);
    if let Some(port) = args.port {
        cfg.global.set_port(port);
    }
    if let Some(file) = args.censor_file {
        cfg.censor.word_file = file;
    }
    if args.verbose {
        cfg.global.log_level = "debug".into();
    }

    init_tracing(cfg.global.log_level());
    cfg.print();

    let censor = CensorList::load(cfg.censor.word_file(), cfg.censor.replacement()).await;
    let overlapping = censor.words_in_replacement();
    if !overlapping.is_empty() {
        warn!(
            target: "hush::censor",
            words = ?overlapping,
            replacement = %censor.replacement(),
            "Replacement contains censored words; later words may rewrite earlier replacements"
        );
    }

    let proxy = Arc::new(Proxy::from_config(&cfg, censor));
    let listen = cfg.global.listen.clone();

    Master::new(cfg, proxy)
        .run()
        .await
        .with_context(|| format!("proxy failed on {listen}"))
}
