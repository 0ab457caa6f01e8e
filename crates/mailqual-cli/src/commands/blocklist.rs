use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use mailqual_blocklist::{BlocklistService, ImportPolicy};

use crate::cli::BlocklistCommand;
use crate::summary;

pub fn run(state_dir: &Path, command: BlocklistCommand) -> Result<()> {
    let service = BlocklistService::init(&state_dir.join("blocklist"))?;

    match command {
        BlocklistCommand::AddEmail { email, note } => {
            service.add_email(&email, note.as_deref())?;
            println!("blocked {email}");
        }
        BlocklistCommand::AddDomain { domain, note } => {
            service.add_domain(&domain, note.as_deref())?;
            println!("blocked domain {domain}");
        }
        BlocklistCommand::RemoveEmail { email } => {
            service.remove_email(&email)?;
            println!("unblocked {email}");
        }
        BlocklistCommand::RemoveDomain { domain } => {
            service.remove_domain(&domain)?;
            println!("unblocked domain {domain}");
        }
        BlocklistCommand::Import { log, statuses } => {
            let file = std::fs::File::open(&log)?;
            let policy = match statuses {
                Some(statuses) => ImportPolicy {
                    allowed_statuses: statuses.into_iter().map(|s| s.to_lowercase()).collect::<BTreeSet<_>>(),
                },
                None => ImportPolicy::default(),
            };
            let promoted = service.import_from_log(file, &policy)?;
            println!("imported log; promoted {} domain(s) to blocked: {:?}", promoted.len(), promoted);
            summary::print_blocklist_stats(&service.stats());
        }
        BlocklistCommand::Export => {
            print!("{}", service.export());
        }
        BlocklistCommand::Stats => {
            summary::print_blocklist_stats(&service.stats());
        }
        BlocklistCommand::Undo => {
            let event = service.undo_last()?;
            println!("undid {:?} on {}", event.operation, event.target);
        }
        BlocklistCommand::Redo => {
            let event = service.redo_last()?;
            println!("redid {:?} on {}", event.operation, event.target);
        }
    }
    Ok(())
}
