// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use crate::app::AppContext;
use crate::app::commands::{Command, QueueCommand};
use crate::app::errors::AppResult;
use crate::app::handlers;

pub struct Dispatcher {
    ctx: AppContext,
}

impl Dispatcher {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub async fn dispatch(&self, command: Command) -> AppResult<i32> {
        let result = match command {
            Command::Report(cmd) => handlers::handle_report(&self.ctx, cmd).await,
            Command::Tether(cmd) => handlers::handle_tether(&self.ctx, cmd).await,
            Command::Queue(cmd) => match cmd {
                QueueCommand::Add(cmd) => handlers::handle_queue_add(&self.ctx, cmd).await,
                QueueCommand::List => handlers::handle_queue_list(&self.ctx).await,
                QueueCommand::Remove(cmd) => handlers::handle_queue_remove(&self.ctx, cmd).await,
                QueueCommand::Clear => handlers::handle_queue_clear(&self.ctx).await,
                QueueCommand::Submit(cmd) => handlers::handle_queue_submit(&self.ctx, cmd).await,
            },
            Command::Status(cmd) => handlers::handle_status(&self.ctx, cmd).await,
        };

        match result {
            Ok(output) => {
                self.ctx.output.render(&output).await?;
                Ok(0)
            }
            Err(err) => {
                self.ctx.output.render_error(&err).await?;
                Ok(err.exit_code)
            }
        }
    }
}
