mod local;

use colored::Colorize;

const USAGE: &str =
    "Usage: brainflow-cli <info <board_id> | record <config.yaml> | spectrum <config.yaml>>";

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("{}", USAGE);
        return;
    }

    let result = match args[1].as_str() {
        "info" => local::info::run(&args[2]),
        "record" => local::record::run(&args[2]),
        "spectrum" => local::spectrum::run(&args[2]),
        _ => {
            println!("Invalid argument, please use 'info', 'record' or 'spectrum'");
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
