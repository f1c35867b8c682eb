use tracing::warn;

use crate::app::{AppContext, EncyeError, Result};
use crate::domain::{Article, ArticleQuery, Comment, CommentTarget, Post};
use crate::paging::ArticleScope;
use crate::presenter::{DetailState, Edge, FeedStatus};
use crate::session::SessionStore;

/// Turn a feed's final status into output or an error.
fn finish(status: FeedStatus, shown: usize) -> Result<()> {
    match status {
        FeedStatus::Failed(e) => return Err(e.into()),
        FeedStatus::Empty => println!("Nothing here yet"),
        FeedStatus::Loading => {}
        FeedStatus::Ready { footer, .. } => match footer {
            Edge::Failed(e) => {
                warn!("Stopped after {} items: {}", shown, e);
                println!("\n{} items (stopped early: {})", shown, e);
            }
            Edge::End => println!("\n{} items, end of feed", shown),
            Edge::None | Edge::Loading => println!("\n{} items", shown),
        },
    }
    Ok(())
}

fn print_article(article: &Article) {
    println!(
        "{}  [{}] {}  by {}  {}",
        article.id,
        article.category_name(),
        article.title,
        article.author_name(),
        article.display_date()
    );
}

fn print_post(post: &Post) {
    let content = post.plain_content();
    let preview: String = content.chars().take(80).collect();
    println!(
        "{}  {}  {}  ({} likes, {} comments)",
        post.display_date(),
        post.created_by.display_name(),
        preview,
        post.like_count,
        post.comment_count
    );
}

fn print_comment(comment: &Comment) {
    println!(
        "  {} {}: {}",
        comment.display_date(),
        comment.created_by.display_name(),
        comment.content
    );
}

pub async fn list_articles(ctx: &AppContext, scope: ArticleScope, pages: usize) -> Result<()> {
    let presenter = ctx.articles(scope);
    let status = presenter.feed().load_pages(pages).await;

    let snapshot = presenter.feed().snapshot();
    for article in &snapshot.items {
        print_article(article);
    }
    finish(status, snapshot.len())
}

pub async fn search_articles(
    ctx: &AppContext,
    query: &str,
    category: Option<String>,
    section: Option<String>,
    pages: usize,
) -> Result<()> {
    let query = ArticleQuery {
        category,
        section,
        ..ArticleQuery::text(query)
    };
    list_articles(ctx, ArticleScope::Search(query), pages).await
}

pub async fn list_posts(ctx: &AppContext, pages: usize) -> Result<()> {
    let home = ctx.home();
    let status = home.posts().load_pages(pages).await;

    let snapshot = home.posts().snapshot();
    for post in &snapshot.items {
        print_post(post);
    }
    finish(status, snapshot.len())
}

pub async fn show_article(ctx: &AppContext, id: &str) -> Result<()> {
    let presenter = ctx.articles(ArticleScope::All);
    let comments = ctx.comments(CommentTarget::Article, id);

    let (detail, _) = futures::join!(presenter.open_detail(id), comments.feed().load_pages(1));

    let article = match detail {
        DetailState::Loaded(article) => article,
        DetailState::Failed(e) => return Err(e.into()),
        DetailState::Empty | DetailState::Loading => {
            return Err(EncyeError::Other(format!("Article {} did not load", id)))
        }
    };

    println!("{}", article.title);
    println!(
        "{} · {} · {}",
        article.category_name(),
        article.author_name(),
        article.display_date()
    );
    if let Some(url) = article.image_url() {
        println!("{}", url);
    }
    println!("\n{}\n", article.plain_description());

    let snapshot = comments.feed().snapshot();
    println!("Comments:");
    for comment in &snapshot.items {
        print_comment(comment);
    }
    if snapshot.is_empty() {
        println!("  (none)");
    }
    Ok(())
}

pub async fn list_comments(
    ctx: &AppContext,
    target: CommentTarget,
    item_id: &str,
    pages: usize,
) -> Result<()> {
    let presenter = ctx.comments(target, item_id);
    let status = presenter.feed().load_pages(pages).await;

    let snapshot = presenter.feed().snapshot();
    for comment in &snapshot.items {
        print_comment(comment);
    }
    finish(status, snapshot.len())
}

pub async fn post_comment(
    ctx: &AppContext,
    target: CommentTarget,
    item_id: &str,
    text: &str,
) -> Result<()> {
    if ctx.session.token()?.is_none() {
        return Err(EncyeError::NotSignedIn);
    }

    let presenter = ctx.comments(target, item_id);
    let comment = presenter.post_comment(text).await?;
    println!("Posted comment {}", comment.id);
    Ok(())
}

pub async fn login(ctx: &AppContext, code: &str) -> Result<()> {
    use crate::presenter::OnboardingState;

    let onboarding = ctx.onboarding();
    match onboarding.on_auth_code_received(code).await {
        OnboardingState::Success { is_new_user } => {
            let name = onboarding
                .current_session()?
                .map(|s| s.display_name())
                .unwrap_or_default();
            if is_new_user {
                println!("Welcome to encye, {}!", name);
            } else {
                println!("Signed in as {}", name);
            }
            Ok(())
        }
        OnboardingState::Failed(message) => Err(EncyeError::Session(message)),
        OnboardingState::Idle | OnboardingState::Loading => {
            Err(EncyeError::Session("sign-in did not complete".into()))
        }
    }
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    if ctx.session.load()?.is_none() {
        println!("Not signed in");
        return Ok(());
    }
    ctx.onboarding().sign_out()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.load()? {
        Some(session) => {
            println!(
                "{} (token {}, since {})",
                session.display_name(),
                session.fingerprint(),
                session.created_at.format("%Y-%m-%d %H:%M")
            );
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::config::{ApiConfig, Config};
    use crate::session::Session;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(server: &MockServer) -> AppContext {
        let config = Config {
            api: ApiConfig::with_base_url(server.uri()),
            ..Default::default()
        };
        AppContext::in_memory(config).unwrap()
    }

    #[test]
    fn test_failed_first_load_is_an_error() {
        let err = finish(FeedStatus::Failed(ApiError::Network("down".into())), 0).unwrap_err();
        assert!(matches!(err, EncyeError::Api(ApiError::Network(_))));
    }

    #[test]
    fn test_failed_append_is_not_an_error() {
        let status = FeedStatus::Ready {
            header: Edge::End,
            footer: Edge::Failed(ApiError::Network("down".into())),
        };
        assert!(finish(status, 10).is_ok());
    }

    #[tokio::test]
    async fn test_comment_requires_session() {
        let server = MockServer::start().await;
        let ctx = context(&server);

        let err = post_comment(&ctx, CommentTarget::Post, "p1", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, EncyeError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_show_missing_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/article/a404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "msg": "Article not found"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/comment/all/Article/a404"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "msg": "ok",
                "data": []
            })))
            .mount(&server)
            .await;

        let ctx = context(&server);
        let err = show_article(&ctx, "a404").await.unwrap_err();
        assert!(matches!(
            err,
            EncyeError::Api(ApiError::Server { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let server = MockServer::start().await;
        let ctx = context(&server);
        ctx.session.save(&Session::new("jwt")).unwrap();

        logout(&ctx).unwrap();
        assert!(ctx.session.load().unwrap().is_none());
    }
}
