use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_TARGET: &str = "./index.html";

fn main() {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--dump") => {
            let target = args.next().unwrap_or_else(|| DEFAULT_TARGET.to_string());
            if let Err(err) = browser::headless::dump(&target) {
                eprintln!("weft: {err}");
                std::process::exit(1);
            }
        }
        initial => {
            let initial = initial.map(str::to_string).or_else(|| {
                std::path::Path::new(DEFAULT_TARGET)
                    .exists()
                    .then(|| DEFAULT_TARGET.to_string())
            });
            platform::run("weft", Box::new(browser::Shell::new(initial)));
        }
    }
}
