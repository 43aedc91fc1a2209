mod config;
mod repl;

use mathpad_engine::Engine;
use mathpad_eval::Evaluator;
use mathpad_session::Icon;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        // One-shot evaluation, no persistence: `mathpad eval "2+2"`
        Some((cmd, rest)) if cmd == "eval" => {
            if rest.is_empty() {
                eprintln!("Usage: mathpad eval <expression>");
                std::process::exit(2);
            }
            let expr = rest.join(" ");
            let mut engine = Engine::new(Evaluator::new());
            let record = engine.evaluate(&expr);
            if record.icon == Icon::Error {
                eprintln!("Error: {}", record.result);
                std::process::exit(1);
            }
            println!("{}", record.result);
        }
        Some((cmd, _)) => {
            eprintln!("Unknown command: {cmd}");
            eprintln!("Usage: mathpad [eval <expression>]");
            std::process::exit(2);
        }
        None => {
            let config = config::PadConfig::load();
            let mut repl = repl::Repl::new(&config);
            if let Err(e) = repl.run() {
                eprintln!("Error: {e:?}");
                std::process::exit(1);
            }
        }
    }
}
