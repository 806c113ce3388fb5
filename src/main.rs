fn main() {
    if let Err(err) = dealerdb::app::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
