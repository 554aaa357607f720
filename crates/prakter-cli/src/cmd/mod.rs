pub mod changelog;
pub mod config;
pub mod init;
pub mod refresh;
pub mod todo;
pub mod tree;
pub mod ui;

use anyhow::Context;
use prakter_core::commands::CommandContext;
use prakter_core::config::Config;
use prakter_core::generate::{CommandGenerator, ContentGenerator, StaticGenerator};
use prakter_core::prompt::Prompter;
use prakter_core::store::Store;
use std::path::Path;

/// Everything a host command needs, opened once per invocation.
pub struct Session {
    pub store: Store,
    pub config: Config,
    generator: Box<dyn ContentGenerator>,
    prompter: Box<dyn Prompter>,
}

impl Session {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let store = Store::open(root)?;
        let config = Config::load(root).context("failed to load .prakter/config.yaml")?;
        let generator = generator_for(&config);
        Ok(Self {
            store,
            config,
            generator,
            prompter: crate::prompter::for_stdin(),
        })
    }

    pub fn ctx(&mut self) -> CommandContext<'_> {
        CommandContext::new(
            &self.store,
            &self.config,
            self.generator.as_ref(),
            self.prompter.as_mut(),
        )
    }
}

/// The configured external generator, or the built-in defaults.
pub fn generator_for(config: &Config) -> Box<dyn ContentGenerator> {
    match CommandGenerator::from_config(&config.generator) {
        Some(g) => Box::new(g),
        None => Box::new(StaticGenerator::today()),
    }
}
