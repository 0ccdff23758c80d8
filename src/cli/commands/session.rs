//! Session commands - Intake sessions and finalization

use crate::cli::SessionCommand;
use crate::errors::Result;
use crate::schemas::{Session, StepPayload};

use super::{read_payload, CommandContext};

pub fn run(ctx: &CommandContext, command: SessionCommand) -> Result<()> {
    let mediation = ctx.open()?;
    match command {
        SessionCommand::New => {
            let session = mediation.create_session(&ctx.actor)?;
            ctx.emit(&session, |s| println!("Session {} created", s.session_id))
        }
        SessionCommand::Join { parent_session_id } => {
            let session = mediation.join_case(&ctx.actor, &parent_session_id)?;
            ctx.emit(&session, |s| {
                println!(
                    "Session {} joins {}",
                    s.session_id, parent_session_id
                )
            })
        }
        SessionCommand::Step {
            session_id,
            step,
            file,
        } => {
            let payload: StepPayload = read_payload(&file)?;
            let outcome = mediation.submit_step(&ctx.actor, &session_id, step, payload)?;
            ctx.emit(&outcome, |o| println!("Saved {}; next: {}", step, o.next))
        }
        SessionCommand::Show { session_id } => {
            let session = mediation.get_session(&ctx.actor, &session_id)?;
            ctx.emit(&session, print_session)
        }
        SessionCommand::Finalize { session_id } => {
            let case_id = mediation.finalize(&ctx.actor, &session_id)?;
            ctx.emit(&serde_json::json!({ "case_id": &case_id }), |_| {
                println!("Finalized into case {}", case_id)
            })
        }
    }
}

fn print_session(session: &Session) {
    println!("Session {} ({})", session.session_id, session.role);
    if let Some(parent) = &session.parent_session_id {
        println!("  joins:    {}", parent);
    }
    println!(
        "  step:     {} ({}/6 completed)",
        session.current_step,
        session.completed_steps.len()
    );
    if let Some(case_id) = &session.case_id {
        println!("  case:     {}", case_id);
    }
    if session.archived {
        println!("  archived");
    } else if session.is_complete() {
        println!("  ready to finalize");
    }
}
