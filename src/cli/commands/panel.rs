//! Panel and panelist commands

use crate::cli::{PanelCommand, PanelistCommand};
use crate::errors::Result;

use super::CommandContext;

pub fn run(ctx: &CommandContext, command: PanelCommand) -> Result<()> {
    let mediation = ctx.open()?;
    match command {
        PanelCommand::Assign {
            case_id,
            panelist_ids,
        } => {
            let report = mediation.assign_panel(&ctx.actor, &case_id, &panelist_ids)?;
            ctx.emit(&report, |r| {
                for id in &r.accepted {
                    println!("assigned  {}", id);
                }
                for rejection in &r.rejected {
                    println!(
                        "rejected  {}: {}",
                        rejection.panelist_id,
                        rejection.to_error(&case_id)
                    );
                }
                println!("{} is {}", r.case.case_id, r.case.status);
            })
        }
        PanelCommand::Remove {
            case_id,
            panelist_id,
        } => {
            let case = mediation.remove_panelist(&ctx.actor, &case_id, &panelist_id)?;
            ctx.emit(&case, |c| {
                println!(
                    "Removed {} from {} ({} active, {})",
                    panelist_id,
                    c.case_id,
                    c.active_panel_count(),
                    c.status
                )
            })
        }
    }
}

pub fn run_registry(ctx: &CommandContext, command: PanelistCommand) -> Result<()> {
    let mediation = ctx.open()?;
    match command {
        PanelistCommand::Add {
            panelist_id,
            name,
            max_active_cases,
        } => {
            let panelist =
                mediation.register_panelist(&ctx.actor, &panelist_id, &name, max_active_cases)?;
            ctx.emit(&panelist, |p| {
                println!("Registered {} (max {} cases)", p.panelist_id, p.max_active_cases)
            })
        }
        PanelistCommand::List => {
            let panelists = mediation.list_panelists(&ctx.actor)?;
            ctx.emit(&panelists, |list| {
                for p in list {
                    println!(
                        "{:<12} {:<24} {}/{}",
                        p.panelist_id,
                        p.name,
                        p.load(),
                        p.max_active_cases
                    );
                }
            })
        }
    }
}
