//! `nimbus watch <kind>`: live view of one collection.
//!
//! Connects the console's event stream, then re-renders the current page
//! every time the store reports a change. Runs until Ctrl-C.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::pin::Pin;

use tracing::debug;

use nimbus_core::{Filter, Registered, ResourceVisitor, SessionState};

use super::Ctx;
use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

struct Watch<'c, 'a> {
    ctx: &'c mut Ctx<'a>,
    filter: Vec<String>,
}

impl<'c, 'a> ResourceVisitor for Watch<'c, 'a> {
    type Output = Pin<Box<dyn Future<Output = Result<(), CliError>> + 'c>>;

    fn visit<R: Registered>(self) -> Self::Output {
        Box::pin(watch::<R>(self.ctx, self.filter))
    }
}

pub async fn handle(ctx: &mut Ctx<'_>, args: WatchArgs) -> Result<(), CliError> {
    args.kind
        .visit(Watch {
            ctx,
            filter: args.filter,
        })
        .await
}

async fn watch<R: Registered>(ctx: &mut Ctx<'_>, filter: Vec<String>) -> Result<(), CliError> {
    let console = ctx.console;
    let store = console.store::<R>();
    let mut changes = store.subscribe();
    let mut session = console.session().subscribe();

    let result = console.actions::<R>().filter(Filter::parse_pairs(&filter)).await;
    ctx.settle(result)?;
    console.listen()?;
    render::<R>(ctx)?;

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = changes.changed() => {
                if !changed {
                    break Ok(());
                }
                debug!(kind = %R::KIND, version = changes.version(), "store changed");
                ctx.flush_alerts();
                render::<R>(ctx)?;
            }
            changed = session.changed() => {
                if changed.is_err() || *session.borrow() == SessionState::Expired {
                    break Err(CliError::SessionExpired { profile: ctx.profile.clone() });
                }
            }
        }
    };

    ctx.flush_alerts();
    console.shutdown().await;
    outcome
}

fn render<R: Registered>(ctx: &Ctx<'_>) -> Result<(), CliError> {
    let store = ctx.console.store::<R>();
    let items: Vec<R> = store.items_mut();

    let table = matches!(ctx.global.output, OutputFormat::Table);
    let format = if table {
        OutputFormat::Table
    } else {
        OutputFormat::JsonCompact
    };
    let rendered = output::render_list(&format, &items)?;

    if table && io::stdout().is_terminal() {
        print!("{CLEAR_SCREEN}");
    }
    ctx.print(&rendered);
    if table && !ctx.global.quiet {
        eprintln!(
            "{}",
            output::page_footer(store.page(), store.pages(), store.count(), ctx.color)
        );
    }
    Ok(())
}
