//! Resolution commands - The caller acts as the panelist

use crate::cli::ResolutionCommand;
use crate::errors::Result;
use crate::schemas::ResolutionPayload;

use super::{read_payload, CommandContext};

pub fn run(ctx: &CommandContext, command: ResolutionCommand) -> Result<()> {
    let mediation = ctx.open()?;
    let panelist_id = ctx.actor.id.clone();
    match command {
        ResolutionCommand::Submit { case_id, file } => {
            let payload: ResolutionPayload = read_payload(&file)?;
            let outcome = mediation.submit_resolution(&ctx.actor, &case_id, &panelist_id, payload)?;
            ctx.emit(&outcome, |o| {
                println!("Submitted ({} of panel)", o.progress);
                if o.resolution_complete {
                    println!("Panel complete; {} resolved", case_id);
                }
            })
        }
        ResolutionCommand::Draft { case_id, file } => {
            let payload: ResolutionPayload = read_payload(&file)?;
            let draft = mediation.save_draft(&ctx.actor, &case_id, &panelist_id, payload)?;
            ctx.emit(&draft, |d| println!("Draft saved at {}", d.updated_at))
        }
        ResolutionCommand::Status { case_id } => {
            let report = mediation.resolution_status(&ctx.actor, &case_id)?;
            ctx.emit(&report, |r| {
                println!("{}: {} ({} submitted)", r.case_id, r.status, r.progress);
                for e in &r.entries {
                    let state = e
                        .state
                        .map(|s| format!("{:?}", s).to_lowercase())
                        .unwrap_or_else(|| "none".to_string());
                    println!("  {:<12} {:?} {}", e.panelist_id, e.assignment_status, state);
                }
            })
        }
    }
}
