use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "converge")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declaratively reconcile resources against external platforms", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base URL of the example platform API
    #[arg(long, env = "API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory where scopes are persisted
    #[arg(long, env = "CONVERGE_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Declare and inspect example-platform users
    #[command(subcommand)]
    User(UserCommand),

    /// Delete a single resource from a scope
    Delete(DeleteArgs),

    /// Tear down every resource in a scope (last created first)
    Destroy(DestroyArgs),

    /// List persisted scopes
    Scopes(ScopesArgs),

    /// Show the resources tracked by a scope
    Status(ScopeArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// User Commands
// ============================================================================

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create the user, or update it if the id was applied before
    Apply(UserApplyArgs),

    /// Show a user's stored output and its live record
    Get(UserGetArgs),
}

#[derive(Args)]
pub struct UserApplyArgs {
    /// Logical id of the user within the scope
    pub id: String,

    /// Organization to add the user to
    #[arg(long)]
    pub org_id: String,

    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    /// An interesting fact about the user
    #[arg(long)]
    pub fun_fact: Option<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Args)]
pub struct UserGetArgs {
    /// Logical id of the user within the scope
    pub id: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

// ============================================================================
// Scope Commands
// ============================================================================

#[derive(Args, Default)]
pub struct ScopeArgs {
    /// Scope name (defaults to the configured scope)
    #[arg(short, long)]
    pub scope: Option<String>,
}

#[derive(Args)]
pub struct ScopesArgs {
    /// Remove the files of destroyed scopes
    #[arg(long)]
    pub prune: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Logical id of the resource to delete
    pub id: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Args)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_apply() {
        let cli = Cli::try_parse_from([
            "converge",
            "user",
            "apply",
            "u1",
            "--org-id",
            "org-1",
            "--first-name",
            "A",
            "--last-name",
            "B",
            "--scope",
            "demo",
        ])
        .unwrap();

        match cli.command {
            Command::User(UserCommand::Apply(args)) => {
                assert_eq!(args.id, "u1");
                assert_eq!(args.org_id, "org-1");
                assert_eq!(args.first_name, "A");
                assert!(args.fun_fact.is_none());
                assert_eq!(args.scope.scope.as_deref(), Some("demo"));
            }
            _ => panic!("expected user apply"),
        }
    }

    #[test]
    fn test_parse_destroy_with_globals() {
        let cli = Cli::try_parse_from([
            "converge",
            "destroy",
            "--yes",
            "-vv",
            "--api-url",
            "http://localhost:8787/api",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8787/api"));
        match cli.command {
            Command::Destroy(args) => {
                assert!(args.yes);
                assert!(args.scope.scope.is_none());
            }
            _ => panic!("expected destroy"),
        }
    }
}
