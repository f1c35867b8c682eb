pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::CommentTarget;

#[derive(Parser)]
#[command(name = "encye")]
#[command(about = "Browse encye articles, posts and comments", long_about = None)]
pub struct Cli {
    /// Items per page (overrides the config file)
    #[arg(short = 'n', long, global = true)]
    pub page_size: Option<u32>,

    /// Config file to read instead of ~/.config/encye/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List articles
    Articles {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,

        /// Only articles from your organization
        #[arg(long)]
        org: bool,
    },
    /// List community posts
    Posts {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Search articles
    Search {
        query: String,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        section: Option<String>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Show one article with its first comments
    Article {
        id: String,
    },
    /// List comments on an article or post
    Comments {
        /// "article" or "post"
        on_model: CommentTarget,
        item_id: String,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Comment on an article or post
    Comment {
        /// "article" or "post"
        on_model: CommentTarget,
        item_id: String,
        text: String,
    },
    /// Sign in with an authorization code from the Google consent screen
    Login {
        code: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_comment_target() {
        let cli = Cli::try_parse_from(["encye", "comments", "Post", "p1", "--pages", "2"]).unwrap();
        match cli.command {
            Commands::Comments {
                on_model,
                item_id,
                pages,
            } => {
                assert_eq!(on_model, CommentTarget::Post);
                assert_eq!(item_id, "p1");
                assert_eq!(pages, 2);
            }
            _ => panic!("expected comments command"),
        }
    }

    #[test]
    fn test_global_page_size() {
        let cli = Cli::try_parse_from(["encye", "articles", "--org", "-n", "25"]).unwrap();
        assert_eq!(cli.page_size, Some(25));
        assert!(matches!(cli.command, Commands::Articles { org: true, pages: 1 }));
    }

    #[test]
    fn test_unknown_comment_target_is_rejected() {
        assert!(Cli::try_parse_from(["encye", "comments", "video", "v1"]).is_err());
    }
}
