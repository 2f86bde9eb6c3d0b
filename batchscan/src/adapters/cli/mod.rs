// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

pub mod args;

use crate::app::commands::*;
use crate::app::services::report::ClassificationPolicy;
use crate::config::Overrides;
use args::{Cli, Cmd, QueueCmd};

/// Config values a subcommand's flags take precedence over.
pub fn overrides_from_cli(cli: &Cli) -> Overrides {
    match &cli.cmd {
        Cmd::Report(args) => Overrides {
            workers: args.workers,
            on_classification_error: args.annotate.then_some(ClassificationPolicy::Annotate),
            ..Overrides::default()
        },
        _ => Overrides::default(),
    }
}

pub fn command_from_cli(cli: Cli) -> Command {
    match cli.cmd {
        Cmd::Report(args) => Command::Report(ReportCommand {
            root: args.root,
            marker: args.filename,
            output: args.output,
        }),
        Cmd::Tether(args) => Command::Tether(TetherCommand {
            root: args.root,
            marker: args.filename,
            staging: args.staging,
            per_job: args.per_job,
            header: args.header,
            executable: args.executable,
            script_name: args.script_name,
        }),
        Cmd::Queue(queue_args) => Command::Queue(match queue_args.cmd {
            QueueCmd::Add(args) => QueueCommand::Add(QueueAddCommand {
                directory: args.directory,
                script_name: args.script,
                priority: args.priority,
            }),
            QueueCmd::List => QueueCommand::List,
            QueueCmd::Remove(args) => QueueCommand::Remove(QueueRemoveCommand {
                directory: args.directory,
            }),
            QueueCmd::Clear => QueueCommand::Clear,
            QueueCmd::Submit(args) => QueueCommand::Submit(QueueSubmitCommand { max: args.max }),
        }),
        Cmd::Status(args) => Command::Status(StatusCommand { user: args.user }),
        Cmd::Completions(_) => {
            unreachable!("completions handled before dispatcher")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn annotate_flag_becomes_policy_override() {
        let cli = Cli::parse_from(["batchscan", "report", "/runs", "--annotate"]);
        let overrides = overrides_from_cli(&cli);
        assert_eq!(
            overrides.on_classification_error,
            Some(ClassificationPolicy::Annotate)
        );
        assert!(overrides.workers.is_none());
    }

    #[test]
    fn report_without_annotate_keeps_config_policy() {
        let cli = Cli::parse_from(["batchscan", "report", "/runs"]);
        assert!(overrides_from_cli(&cli).on_classification_error.is_none());
    }

    #[test]
    fn report_maps_filename_to_marker() {
        let cli = Cli::parse_from(["batchscan", "report", "/runs", "-f", "job.sh"]);
        match command_from_cli(cli) {
            Command::Report(cmd) => assert_eq!(cmd.marker, "job.sh"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
