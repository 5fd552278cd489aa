use super::*;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Dashboard for the git repositories under a directory"
)]
pub(super) struct Cli {
    #[command(subcommand)]
    pub(super) command: Option<Commands>,
}

#[derive(clap::Subcommand)]
pub(super) enum Commands {
    #[command(about = "Launch terminal dashboard (default)")]
    Tui(RootArgs),
    #[command(about = "Scan and print the state of every repository")]
    Status(StatusArgs),
    #[command(about = "Fetch origin")]
    Fetch(TaskArgs),
    #[command(about = "Fast-forward the current branch to its upstream")]
    FastForward(TaskArgs),
    #[command(about = "Push the current branch to origin")]
    Push(TaskArgs),
    #[command(about = "Manage config")]
    Config(ConfigArgs),
    #[command(about = "Manage the origin credential")]
    Credentials(CredentialsArgs),
}

#[derive(clap::Args, Default)]
pub(super) struct RootArgs {
    #[arg(long, help = "Directory to scan (defaults to the saved base directory)")]
    pub(super) root: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct StatusArgs {
    #[command(flatten)]
    pub(super) root: RootArgs,
    #[arg(long, help = "Print the snapshot as JSON")]
    pub(super) json: bool,
}

#[derive(clap::Args)]
pub(super) struct TaskArgs {
    #[command(flatten)]
    pub(super) root: RootArgs,
    #[arg(long, help = "Only this repository (defaults to every idle repository)")]
    pub(super) repo: Option<PathBuf>,
}

#[derive(Parser)]
pub(super) struct ConfigArgs {
    #[command(subcommand)]
    pub(super) command: ConfigCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum ConfigCommands {
    #[command(about = "Print the config file location and contents")]
    Show,
    #[command(about = "Save the base directory to scan")]
    SetRoot(SetRootArgs),
}

#[derive(Parser)]
pub(super) struct SetRootArgs {
    pub(super) path: PathBuf,
}

#[derive(Parser)]
pub(super) struct CredentialsArgs {
    #[command(subcommand)]
    pub(super) command: CredentialsCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum CredentialsCommands {
    #[command(about = "Store the credential used for origin")]
    Set(SetCredentialArgs),
}

#[derive(Parser)]
pub(super) struct SetCredentialArgs {
    #[arg(long)]
    pub(super) username: String,
    #[arg(long, help = "Secret or token (read from stdin when omitted)")]
    pub(super) secret: Option<String>,
}
