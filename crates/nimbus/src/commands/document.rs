//! Settings and subscription handlers.

use super::{Ctx, util};
use crate::cli::{SettingsArgs, SettingsCommand, SubscriptionArgs, SubscriptionCommand};
use crate::error::CliError;
use crate::output;

pub async fn settings(ctx: &mut Ctx<'_>, args: SettingsArgs) -> Result<(), CliError> {
    let console = ctx.console;
    let slot = console.settings();

    let result = slot.actions.sync().await;
    ctx.settle(result)?;
    let current = slot.store.get_mut().unwrap_or_default();

    match args.command {
        SettingsCommand::Get => {
            ctx.print(&output::render_single(&ctx.global.output, &current, "settings")?);
            Ok(())
        }
        SettingsCommand::Set { from_file } => {
            let updated = util::merge_fields(&current, util::read_json_file(&from_file)?)?;
            let result = slot.actions.commit(&updated).await;
            ctx.settle(result)?;
            ctx.status("Saved settings");
            Ok(())
        }
    }
}

pub async fn subscription(ctx: &mut Ctx<'_>, args: SubscriptionArgs) -> Result<(), CliError> {
    let console = ctx.console;
    let slot = console.subscription();

    let result = match args.command {
        SubscriptionCommand::Get => slot.actions.sync().await,
        SubscriptionCommand::Update => slot.actions.sync_update().await,
        SubscriptionCommand::Activate { ref license } => slot.actions.activate(license).await,
    };
    ctx.settle(result)?;

    if let SubscriptionCommand::Activate { .. } = args.command {
        ctx.status("Subscription activated");
    }
    let current = slot.store.get_mut().unwrap_or_default();
    let id = current.plan.clone().unwrap_or_default();
    ctx.print(&output::render_single(&ctx.global.output, &current, &id)?);
    Ok(())
}
