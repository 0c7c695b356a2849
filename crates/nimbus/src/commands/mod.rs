//! Command dispatch: bridges CLI args to console actions and output.

pub mod config_cmd;
pub mod document;
pub mod resource;
pub mod util;
pub mod watch;

use strum::IntoEnumIterator;
use tabled::{Table, Tabled, settings::Style};
use tokio::sync::broadcast;

use nimbus_core::{Alert, AlertLevel, Console, CoreError, ResourceKind};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::progress::Spinner;

/// Everything a console-bound handler needs.
pub struct Ctx<'a> {
    pub console: &'a Console,
    pub global: &'a GlobalOpts,
    pub profile: String,
    pub color: bool,
    alerts: broadcast::Receiver<Alert>,
}

impl<'a> Ctx<'a> {
    pub fn new(console: &'a Console, global: &'a GlobalOpts, profile: String) -> Self {
        Self {
            console,
            global,
            profile,
            color: output::should_color(&global.color),
            alerts: console.alerts().subscribe(),
        }
    }

    /// Turn an action result into a CLI result.
    ///
    /// Actions resolve `Ok` after a 401 and flag the session instead, so the
    /// session is checked first. Server rejections are reported with the
    /// wording of the alert the action raised.
    pub fn settle<T>(&mut self, result: Result<T, CoreError>) -> Result<T, CliError> {
        if self.console.session().is_expired() {
            return Err(CliError::SessionExpired {
                profile: self.profile.clone(),
            });
        }
        match result {
            Ok(value) => Ok(value),
            Err(CoreError::Rejected {
                message, status, ..
            }) => Err(CliError::Api {
                status,
                message: self.last_error_alert().unwrap_or(message),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn last_error_alert(&mut self) -> Option<String> {
        let mut last = None;
        while let Ok(alert) = self.alerts.try_recv() {
            if alert.level == AlertLevel::Error {
                last = Some(alert.message);
            }
        }
        last
    }

    /// Print any alerts raised since the last call (used by `watch`).
    pub fn flush_alerts(&mut self) {
        loop {
            match self.alerts.try_recv() {
                Ok(alert) => eprintln!("{}", output::alert_line(&alert, self.color)),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
    }

    /// Status line on stderr unless `--quiet`.
    pub fn status(&self, message: &str) {
        if !self.global.quiet {
            let alert = Alert {
                level: AlertLevel::Success,
                message: message.to_owned(),
            };
            eprintln!("{}", output::alert_line(&alert, self.color));
        }
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.global.quiet);
    }
}

/// Dispatch a console-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &mut Ctx<'_>) -> Result<(), CliError> {
    let _spinner = Spinner::attach(ctx.console.loader(), ctx.global.quiet);

    let init = ctx.console.init().await;
    ctx.settle(init)?;

    match cmd {
        Command::Settings(args) => document::settings(ctx, args).await,
        Command::Subscription(args) => document::subscription(ctx, args).await,
        Command::Watch(args) => watch::handle(ctx, args).await,
        cmd => resource::handle(ctx, cmd).await,
    }
}

#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "KIND")]
    kind: &'static str,
    #[tabled(rename = "PATH")]
    path: String,
    #[tabled(rename = "CHANGE EVENT")]
    event: String,
}

/// `nimbus kinds`: every resource kind the console manages.
pub fn kinds(global: &GlobalOpts) {
    let kinds: Vec<ResourceKind> = ResourceKind::iter().collect();
    let out = match global.output {
        OutputFormat::Table => {
            let rows: Vec<KindRow> = kinds
                .iter()
                .map(|kind| KindRow {
                    kind: (*kind).into(),
                    path: format!("/{}", kind.path()),
                    event: kind.change_event(),
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(&kinds).unwrap_or_default(),
        OutputFormat::JsonCompact => serde_json::to_string(&kinds).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&kinds).unwrap_or_default(),
        OutputFormat::Plain => kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    output::print_output(&out, global.quiet);
}
