//! # Commands
//!
//! A command is a name, help metadata, an ordered chain of checks and a
//! runner. Runners and checks are traits so stateful handlers can be plain
//! structs; async closures taking a [`Context`] implement both.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::application::context::Context;

/// Category assigned to commands registered without one.
pub const DEFAULT_CATEGORY: &str = "Generic";

/// The action executed once every check has passed.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, ctx: Context) -> Result<()>;
}

#[async_trait]
impl<F, Fut> Runner for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: Context) -> Result<()> {
        (self)(ctx).await
    }
}

/// Guard evaluated before the runner. A failing check owns the user-facing
/// explanation and sends it itself before returning `false`.
#[async_trait]
pub trait Check: Send + Sync {
    async fn check(&self, ctx: &Context) -> bool;
}

#[async_trait]
impl<F, Fut> Check for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn check(&self, ctx: &Context) -> bool {
        (self)(ctx.clone()).await
    }
}

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub category: String,
    pub checks: Vec<Arc<dyn Check>>,
    pub runner: Arc<dyn Runner>,
}

impl Command {
    pub fn new(name: impl Into<String>, runner: impl Runner + 'static) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            checks: Vec::new(),
            runner: Arc::new(runner),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Appends a check; checks run in the order they were added.
    pub fn check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("category", &self.category)
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}
