//! Case commands - Reads and admin actions

use crate::cli::CaseCommand;
use crate::errors::Result;
use crate::schemas::{AdminResolution, Case};

use super::CommandContext;

pub fn run(ctx: &CommandContext, command: CaseCommand) -> Result<()> {
    let mediation = ctx.open()?;
    match command {
        CaseCommand::Show { case_id } => {
            let case = mediation.get_case(&ctx.actor, &case_id)?;
            ctx.emit(&case, print_case)
        }
        CaseCommand::List { status } => {
            let cases = mediation.list_cases(&ctx.actor, status)?;
            ctx.emit(&cases, |cases| {
                if cases.is_empty() {
                    println!("No cases");
                }
                for c in cases {
                    println!("{:<18} {:<15} {}", c.case_id, c.status, c.title);
                }
            })
        }
        CaseCommand::AssignAdmin { case_id, admin_id } => {
            let case = mediation.assign_admin(&ctx.actor, &case_id, &admin_id)?;
            ctx.emit(&case, |c| {
                println!("{} owned by {} ({})", c.case_id, admin_id, c.status)
            })
        }
        CaseCommand::Status {
            case_id,
            status,
            feedback,
            next_steps,
        } => {
            let admin_override = match (feedback, next_steps) {
                (Some(feedback), Some(next_steps)) => Some(AdminResolution {
                    feedback,
                    next_steps,
                }),
                _ => None,
            };
            let case = mediation.update_status(&ctx.actor, &case_id, status, admin_override)?;
            ctx.emit(&case, |c| println!("{} is now {}", c.case_id, c.status))
        }
        CaseCommand::Note { case_id, text } => {
            let case = mediation.add_note(&ctx.actor, &case_id, &text)?;
            ctx.emit(&case, |c| println!("Note added to {} ({} notes)", c.case_id, c.notes.len()))
        }
    }
}

fn print_case(case: &Case) {
    println!("{}: {}", case.case_id, case.title);
    println!("  status:   {}", case.status);
    println!("  type:     {:?} / {:?}", case.case_type, case.priority);
    println!("  party A:  {}", case.created_by);
    if let Some(b) = &case.joined_by {
        println!("  party B:  {}", b);
    }
    if let Some(admin) = &case.assigned_to {
        println!("  admin:    {}", admin);
    }
    for a in &case.assigned_panelists {
        println!("  panelist: {} ({:?})", a.panelist_id, a.status);
    }
    println!("  timeline:");
    for entry in &case.timeline {
        println!("    {} {} {}", entry.timestamp, entry.actor, entry.description);
    }
}
