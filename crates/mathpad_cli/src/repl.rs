//! Interactive loop: every accepted line is evaluated and committed; the
//! session commands (`history`, `select`, `vars`, `clear`) sit on top of
//! the engine's public operations.

use std::path::PathBuf;

use mathpad_engine::Engine;
use mathpad_eval::Evaluator;
use mathpad_session::{HistoryPersistence, Icon};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::config::PadConfig;

pub struct Repl {
    engine: Engine<Evaluator>,
}

impl Repl {
    pub fn new(config: &PadConfig) -> Self {
        let persistence = HistoryPersistence::on_disk(config.history_path());
        let engine =
            Engine::with_persistence(Evaluator::new(), config.history_config(), persistence);
        Self { engine }
    }

    pub fn run(&mut self) -> rustyline::Result<()> {
        println!("mathpad {}", env!("CARGO_PKG_VERSION"));
        println!("Enter an expression (e.g., 'a = 5', then 'a + 1').");
        println!("Commands: simplify, derive, rationalize, history, select <n>, vars, clear, quit.");

        let mut rl = DefaultEditor::new()?;

        // Line-editing history, separate from the result cache: ~/.mathpad_history
        let history_path = dirs::home_dir()
            .map(|p| p.join(".mathpad_history"))
            .unwrap_or_else(|| PathBuf::from(".mathpad_history"));

        // Load history if the file exists (errors are silently ignored)
        let _ = rl.load_history(&history_path);

        loop {
            let readline = rl.readline("> ");
            match readline {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line)?;

                    if line == "quit" || line == "exit" {
                        println!("Goodbye!");
                        break;
                    }

                    self.handle_line(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history on exit (errors are silently ignored)
        let _ = rl.save_history(&history_path);

        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        if line == "history" || line == "list" {
            if self.engine.history().is_empty() {
                println!("(history is empty)");
                return;
            }
            for (i, record) in self.engine.history().iter().enumerate() {
                println!("{i:>3}  {}  =  {}", record.equation, record.result);
            }
            return;
        }

        if line == "vars" {
            if self.engine.variables().is_empty() {
                println!("(no variables bound)");
                return;
            }
            for (name, value) in self.engine.variables().list() {
                println!("{name} = {value}");
            }
            return;
        }

        if let Some(rest) = line.strip_prefix("select ") {
            match rest.trim().parse::<usize>() {
                Ok(idx) => match self.engine.history().get(idx) {
                    Some(record) => {
                        let record = record.clone();
                        self.engine.select(record);
                        println!("Moved entry {idx} to the top.");
                    }
                    None => println!("No history entry {idx}."),
                },
                Err(_) => println!("Usage: select <index>"),
            }
            return;
        }

        let record = self.engine.evaluate(line);
        match record.icon {
            Icon::Error => println!("Error: {}", record.result),
            Icon::DeleteForever => {
                // The record is informational; clearing is the explicit call
                self.engine.clear_all();
                println!("History and variables cleared.");
                return;
            }
            _ => println!("= {}", record.result),
        }
        self.engine.commit();
    }
}
