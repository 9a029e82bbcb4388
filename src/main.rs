#[tokio::main]
async fn main() {
    commission::telemetry::init();

    if let Err(e) = commission::cli::run(std::env::args_os()).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
