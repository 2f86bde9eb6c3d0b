// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

pub mod commands;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod ports;
pub mod services;

use std::sync::Arc;

use ports::{FilesystemPort, OutputPort, ShellPort};

use crate::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub output: Arc<dyn OutputPort>,
    pub fs: Arc<dyn FilesystemPort>,
    pub shell: Arc<dyn ShellPort>,
    pub config: Arc<Config>,
}
