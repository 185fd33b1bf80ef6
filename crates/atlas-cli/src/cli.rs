use std::path::PathBuf;

use atlas_nav::Section;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "atlas",
    about = "Atlas: curate travel, resume and home-page content for a personal site",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(short, long, global = true, default_value = "atlas.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// The subcommand to run; the interactive menu when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run(RunArgs::default()))
    }
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum SectionArg {
    Travel,
    Resume,
    Home,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Travel => Section::Travel,
            SectionArg::Resume => Section::Resume,
            SectionArg::Home => Section::Home,
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Start the interactive menu (default)
    Run(RunArgs),
    /// Print the effective configuration with secrets masked
    ShowConfig,
}

#[derive(Clone, Debug, Default, Args)]
pub struct RunArgs {
    /// Open one sub-menu directly instead of the main menu
    #[arg(long, value_enum)]
    pub section: Option<SectionArg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_runs_the_menu() {
        let cli = Cli::try_parse_from(["atlas"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.command(), Command::Run(RunArgs { section: None })));
        assert_eq!(cli.config, PathBuf::from("atlas.toml"));
    }

    #[test]
    fn parse_run_section() {
        let cli = Cli::try_parse_from(["atlas", "run", "--section", "resume"]).unwrap();
        if let Command::Run(args) = cli.command() {
            assert!(matches!(args.section, Some(SectionArg::Resume)));
            assert_eq!(Section::from(args.section.unwrap()), Section::Resume);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_unknown_section_fails() {
        assert!(Cli::try_parse_from(["atlas", "run", "--section", "blog"]).is_err());
    }

    #[test]
    fn parse_show_config_with_path() {
        let cli =
            Cli::try_parse_from(["atlas", "show-config", "--config", "/etc/atlas.toml"]).unwrap();
        assert!(matches!(cli.command(), Command::ShowConfig));
        assert_eq!(cli.config, PathBuf::from("/etc/atlas.toml"));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["atlas", "--verbose", "run"]).unwrap();
        assert!(cli.verbose);
    }
}
