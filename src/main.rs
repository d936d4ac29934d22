use clap::Parser;
use conftable::{
    cli::Cli,
    config::{CredentialChain, ProcessEnv, Settings},
};
use std::{io, process};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout carries the values, everything else goes to stderr
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,conftable=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) resolve settings ─────────────────────────────────────────
    let cli = Cli::parse();
    let chain = CredentialChain::standard(
        cli.user.clone(),
        cli.token.clone(),
        &ProcessEnv,
        !cli.no_input,
    );
    let settings = match Settings::resolve(&cli, &ProcessEnv, &chain) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    info!(base = %settings.base, context = %settings.context, page_id = %settings.page_id, "startup");

    // ─── 3) fetch → parse → print ────────────────────────────────────
    let stdout = io::stdout();
    match conftable::run(&settings, &mut stdout.lock()).await {
        Ok(n) => info!(rows = n, "done"),
        Err(e) => fail(e),
    }
}

fn fail(e: conftable::Error) -> ! {
    eprintln!("error: {e}");
    process::exit(e.exit_code());
}
