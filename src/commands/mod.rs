use crate::cli::Cli;
use crate::request::Request;
use crate::util::xdg;
use crate::{ConfigStore, Relocator};
use anyhow::Result;

mod relocate;

pub fn execute(cli: Cli) -> Result<()> {
    let request = if cli.help {
        Request::Usage
    } else {
        Request::from_args(&cli.versions)
    };

    let config_path = match cli.config {
        Some(path) => path,
        None => xdg::config_file()?,
    };
    let mut relocator = Relocator::new(ConfigStore::new(config_path), xdg::nvm_nodes_dir()?);

    relocate::execute(&mut relocator, &request)
}
