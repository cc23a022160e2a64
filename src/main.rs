fn main() {
    if let Err(err) = swagger_framework::cli::run_cli() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
