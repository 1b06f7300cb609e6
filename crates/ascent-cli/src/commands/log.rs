use ascent_core::EntryLog;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum LogAction {
    /// List recorded practice entries, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let log = EntryLog::open()?;

    match action {
        LogAction::List { json, limit } => {
            let mut entries = log.entries()?;
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no entries");
            } else {
                for entry in &entries {
                    println!("{}  {:>3} min  {}", entry.date, entry.minutes, entry.title);
                }
            }
        }
    }
    Ok(())
}
