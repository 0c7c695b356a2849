//! Generic resource commands: one handler, every kind.
//!
//! The kind is only known at runtime, so handlers are written once against
//! `R: Registered` and picked through `ResourceKind::visit`.

use std::future::Future;
use std::pin::Pin;

use nimbus_core::{Filter, Registered, ResourceKind, ResourceVisitor};

use super::{Ctx, util};
use crate::cli::{
    ActionArgs, Command, CreateArgs, DeleteManyArgs, ListArgs, NamesArgs, OperationArgs,
    OutputFormat, TargetArgs, UpdateArgs,
};
use crate::error::CliError;
use crate::output;

type CommandFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CliError>> + 'a>>;

struct Run<'c, 'a> {
    ctx: &'c mut Ctx<'a>,
    command: Command,
}

impl<'c, 'a> ResourceVisitor for Run<'c, 'a> {
    type Output = CommandFuture<'c>;

    fn visit<R: Registered>(self) -> CommandFuture<'c> {
        Box::pin(run::<R>(self.ctx, self.command))
    }
}

fn kind_of(command: &Command) -> Option<ResourceKind> {
    match command {
        Command::List(ListArgs { kind, .. })
        | Command::Names(NamesArgs { kind, .. })
        | Command::Get(TargetArgs { kind, .. })
        | Command::Delete(TargetArgs { kind, .. })
        | Command::Create(CreateArgs { kind, .. })
        | Command::Update(UpdateArgs { kind, .. })
        | Command::DeleteMany(DeleteManyArgs { kind, .. })
        | Command::Action(ActionArgs { kind, .. })
        | Command::Operation(OperationArgs { kind, .. }) => Some(*kind),
        _ => None,
    }
}

pub async fn handle(ctx: &mut Ctx<'_>, command: Command) -> Result<(), CliError> {
    let kind = kind_of(&command)
        .ok_or_else(|| CliError::Internal(format!("not a resource command: {command:?}")))?;
    kind.visit(Run { ctx, command }).await
}

async fn run<R: Registered>(ctx: &mut Ctx<'_>, command: Command) -> Result<(), CliError> {
    let kind = R::KIND;
    let console = ctx.console;
    let actions = console.actions::<R>();
    let store = console.store::<R>();

    match command {
        Command::List(args) => {
            let result = actions.filter(Filter::parse_pairs(&args.filter)).await;
            ctx.settle(result)?;
            if args.page > 0 {
                let result = actions.traverse(args.page).await;
                ctx.settle(result)?;
            }

            let items: Vec<R> = store.items_mut();
            ctx.print(&output::render_list(&ctx.global.output, &items)?);
            if matches!(ctx.global.output, OutputFormat::Table) && !ctx.global.quiet {
                eprintln!(
                    "{}",
                    output::page_footer(store.page(), store.pages(), store.count(), ctx.color)
                );
            }
            Ok(())
        }

        Command::Names(args) => {
            let scope = util::parse_scope(args.scope.as_deref())?;
            let result = actions.sync_scoped(scope.clone()).await;
            ctx.settle(result)?;

            let items: Vec<R> = store
                .scoped(&scope)
                .map(|items| items.iter().map(|item| item.as_ref().clone()).collect())
                .unwrap_or_default();
            ctx.print(&output::render_list(&ctx.global.output, &items)?);
            Ok(())
        }

        Command::Get(args) => {
            let result = actions.get(&args.id).await;
            let Some(record) = ctx.settle(result)? else {
                return Err(CliError::SessionExpired {
                    profile: ctx.profile.clone(),
                });
            };
            ctx.print(&output::render_single(&ctx.global.output, &record, record.id())?);
            Ok(())
        }

        Command::Create(args) => {
            let record: R = serde_json::from_value(util::read_json_file(&args.from_file)?)?;
            let result = actions.create(&record).await;
            ctx.settle(result)?;
            ctx.status(&format!("Created {}", kind.singular()));
            Ok(())
        }

        Command::Update(args) => {
            let patch = util::read_json_file(&args.from_file)?;
            let result = actions.get(&args.id).await;
            let Some(current) = ctx.settle(result)? else {
                return Err(CliError::SessionExpired {
                    profile: ctx.profile.clone(),
                });
            };

            let updated = util::merge_fields(&current, patch)?;
            let result = actions.commit(&updated).await;
            ctx.settle(result)?;
            ctx.status(&format!("Saved {} {}", kind.singular(), args.id));
            Ok(())
        }

        Command::Delete(args) => {
            let prompt = format!("Delete {} '{}'?", kind.singular(), args.id);
            if !util::confirm(&prompt, ctx.global.yes)? {
                return Ok(());
            }
            let result = actions.remove(&args.id).await;
            ctx.settle(result)?;
            ctx.status(&format!("Deleted {} {}", kind.singular(), args.id));
            Ok(())
        }

        Command::DeleteMany(args) => {
            let verb = if args.force { "Force delete" } else { "Delete" };
            let prompt = format!("{verb} {} {}?", args.ids.len(), kind.plural());
            if !util::confirm(&prompt, ctx.global.yes)? {
                return Ok(());
            }
            let result = if args.force {
                actions.force_remove_multi(&args.ids).await
            } else {
                actions.remove_multi(&args.ids).await
            };
            ctx.settle(result)?;
            ctx.status(&format!("Deleted {} {}", args.ids.len(), kind.plural()));
            Ok(())
        }

        Command::Action(args) => {
            let result = actions.update_multi(&args.ids, &args.action).await;
            ctx.settle(result)?;
            ctx.status(&format!(
                "Sent '{}' to {} {}",
                args.action,
                args.ids.len(),
                kind.plural()
            ));
            Ok(())
        }

        Command::Operation(args) => {
            let result = actions.operation(&args.id, &args.op).await;
            ctx.settle(result)?;
            ctx.status(&format!("Ran '{}' on {} {}", args.op, kind.singular(), args.id));
            Ok(())
        }

        other => Err(CliError::Internal(format!(
            "not a resource command: {other:?}"
        ))),
    }
}

