use clap::Parser;

fn main() {
    let args = twap::arguments::Arguments::parse();
    let config = observe::Config::new(
        &args.log_filter,
        Some(args.log_stderr_threshold),
        args.log_json,
    );
    observe::tracing::initialize(&config);
    tracing::info!("running twap with validated arguments:\n{}", args);
    if let Err(err) = twap::main(args) {
        tracing::error!(?err, "TWAP order simulation failed");
        std::process::exit(1);
    }
}
