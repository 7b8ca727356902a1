fn main() {
    if let Err(e) = rxscan_lib::run() {
        tracing::error!("{e}");
        eprintln!("rxscan: {e}");
        std::process::exit(1);
    }
}
