use gitfleet::ui::output;

fn main() {
    if let Err(err) = gitfleet::cli::run() {
        output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
