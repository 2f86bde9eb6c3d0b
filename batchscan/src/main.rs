// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::sync::Arc;

use batchscan::adapters::cli::args::{Cli, Cmd};
use batchscan::adapters::cli::{command_from_cli, overrides_from_cli};
use batchscan::adapters::fs::StdFilesystem;
use batchscan::adapters::json::JsonOutput;
use batchscan::adapters::shell::LocalShell;
use batchscan::adapters::terminal::TerminalOutput;
use batchscan::app::AppContext;
use batchscan::app::dispatcher::Dispatcher;
use batchscan::app::errors::{AppError, EXIT_CODE_USAGE};
use batchscan::app::ports::OutputPort;
use batchscan::{config, logging};
use clap::{CommandFactory, FromArgMatches};

const HELP_TEMPLATE: &str = r#"batchscan: find, check and submit batch jobs

{before-help}{about-with-newline}{usage-heading} {usage}

{all-args}{after-help}
"#;

fn apply_help_template_recursively(cmd: &mut clap::Command) {
    let mut owned = std::mem::take(cmd);
    owned = owned.help_template(HELP_TEMPLATE);
    for sub in owned.get_subcommands_mut() {
        apply_help_template_recursively(sub);
    }
    *cmd = owned;
}

fn log_config_report(report: &config::ConfigReport) {
    match (&report.config_path, report.config_path_source) {
        (Some(path), Some(source)) => tracing::debug!(
            "config path: {} (source={}, present={})",
            path.display(),
            source.as_str(),
            report.config_file_present
        ),
        (Some(path), None) => tracing::debug!(
            "config path: {} (present={})",
            path.display(),
            report.config_file_present
        ),
        (None, _) => tracing::debug!("config path: (none)"),
    }
    tracing::debug!(
        "config tail_lines: {} (source={})",
        report.tail_lines.value,
        report.tail_lines.source.as_str()
    );
    tracing::debug!(
        "config workers: {} (source={})",
        report.workers.value,
        report.workers.source.as_str()
    );
    tracing::debug!(
        "config on_classification_error: {} (source={})",
        report.on_classification_error.value.as_str(),
        report.on_classification_error.source.as_str()
    );
    tracing::debug!(
        "config queue_path: {} (source={})",
        report.queue_path.value.display(),
        report.queue_path.source.as_str()
    );
    tracing::debug!(
        "config slurm_user: {} (source={})",
        report.slurm_user.value.as_deref().unwrap_or("(unset)"),
        report.slurm_user.source.as_str()
    );
    for kind in &report.kinds {
        tracing::debug!(
            "config kind {}: (source={})",
            kind.value,
            kind.source.as_str()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    apply_help_template_recursively(&mut cmd);
    let matches = cmd.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    if let Cmd::Completions(args) = &cli.cmd {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "batchscan", &mut std::io::stdout());
        return Ok(());
    }

    logging::init(cli.debug);

    let output: Arc<dyn OutputPort> = if cli.json {
        Arc::new(JsonOutput::new())
    } else {
        Arc::new(TerminalOutput::new())
    };

    let overrides = overrides_from_cli(&cli);
    let config::LoadResult { config, report } =
        match config::load_with_report(cli.config.clone(), overrides) {
            Ok(loaded) => loaded,
            Err(err) => {
                let err = AppError::invalid_argument(format!("{err:#}"));
                output.render_error(&err).await?;
                std::process::exit(EXIT_CODE_USAGE);
            }
        };
    log_config_report(&report);

    let ctx = AppContext {
        output,
        fs: Arc::new(StdFilesystem),
        shell: Arc::new(LocalShell),
        config: Arc::new(config),
    };
    let command = command_from_cli(cli);
    let exit_code = Dispatcher::new(ctx).dispatch(command).await?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
