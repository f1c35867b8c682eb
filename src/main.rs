use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use encye::app::AppContext;
use encye::cli::{commands, Cli, Commands};
use encye::config::Config;
use encye::paging::ArticleScope;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(page_size) = cli.page_size {
        config.paging.page_size = page_size;
        config.paging.prefetch_distance = page_size as usize;
        config.validate()?;
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Articles { pages, org } => {
            let scope = if org {
                ArticleScope::Organization
            } else {
                ArticleScope::All
            };
            commands::list_articles(&ctx, scope, pages).await?;
        }
        Commands::Posts { pages } => {
            commands::list_posts(&ctx, pages).await?;
        }
        Commands::Search {
            query,
            category,
            section,
            pages,
        } => {
            commands::search_articles(&ctx, &query, category, section, pages).await?;
        }
        Commands::Article { id } => {
            commands::show_article(&ctx, &id).await?;
        }
        Commands::Comments {
            on_model,
            item_id,
            pages,
        } => {
            commands::list_comments(&ctx, on_model, &item_id, pages).await?;
        }
        Commands::Comment {
            on_model,
            item_id,
            text,
        } => {
            commands::post_comment(&ctx, on_model, &item_id, &text).await?;
        }
        Commands::Login { code } => {
            commands::login(&ctx, &code).await?;
        }
        Commands::Logout => {
            commands::logout(&ctx)?;
        }
        Commands::Whoami => {
            commands::whoami(&ctx)?;
        }
    }

    Ok(())
}
