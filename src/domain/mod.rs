pub mod article;
pub mod comment;
pub mod post;
pub mod text;
pub mod user;

pub use article::{Article, ArticleDraft, ArticleQuery, AutoCategory, Category};
pub use comment::{Comment, CommentRequest, CommentTarget};
pub use post::Post;
pub use user::{AuthGrant, Image, User};

/// Records with a stable server-assigned identifier.
pub trait Identified {
    fn id(&self) -> &str;
}
