fn main() {
    env_logger::init();
    if let Err(err) = package_diagram::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
