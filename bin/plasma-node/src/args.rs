use std::path::PathBuf;

use argh::FromArgs;

#[derive(Debug, Clone, FromArgs)]
#[argh(description = "Plasma MVP child chain node")]
pub(crate) struct Args {
    #[argh(option, short = 'c', description = "path to the TOML config file")]
    pub config: PathBuf,

    #[argh(
        option,
        short = 'd',
        description = "data directory, overrides the one in the config"
    )]
    pub datadir: Option<PathBuf>,

    #[argh(
        switch,
        description = "follow the root chain without submitting headers, even with an operator key"
    )]
    pub no_submit: bool,
}
