mod app;
mod arguments;
mod error;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let stdout = std::io::stdout();
    if let Err(e) = app::run(&argv, &mut stdout.lock()) {
        eprintln!("hello: {}", e);
        std::process::exit(1);
    }
}
