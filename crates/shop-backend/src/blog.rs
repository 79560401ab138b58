//! # Blog Content
//!
//! Listing and detail reads from the blog endpoint. Listings are plain
//! arrays; the detail read is selected with `?slug=`.

use crate::client::BackendClient;
use shop_core::{BlogPost, ShopResult};
use tracing::instrument;

const BLOG_PATH: &str = "api/blog.php";

impl BackendClient {
    /// All published posts, newest first
    #[instrument(skip(self))]
    pub async fn blog_posts(&self) -> ShopResult<Vec<BlogPost>> {
        self.get_json(BLOG_PATH, &[]).await
    }

    /// Posts within one category
    #[instrument(skip(self))]
    pub async fn blog_posts_in_category(&self, category: &str) -> ShopResult<Vec<BlogPost>> {
        self.get_json(BLOG_PATH, &[("category", category.to_string())])
            .await
    }

    /// One post with its full content
    #[instrument(skip(self))]
    pub async fn blog_post(&self, slug: &str) -> ShopResult<BlogPost> {
        self.get_json(BLOG_PATH, &[("slug", slug.to_string())]).await
    }
}
