fn main() {
    if let Err(err) = schema_detect::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
