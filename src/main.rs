fn main() {
    if let Err(err) = metrix_lib::run() {
        log::error!("metrix stopped: {err:#}");
        eprintln!("metrix: {err:#}");
        std::process::exit(1);
    }
}
