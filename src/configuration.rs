use std::path::PathBuf;

/// Runtime configuration, built from the CLI and environment at startup and
/// injected into the store. Nothing here is a compile-time constant.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub db_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub reset: bool,
}

impl Configuration {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            db_path: cli.db_path.clone(),
            log_file: cli.log_file.clone(),
            reset: cli.reset,
        }
    }
}
