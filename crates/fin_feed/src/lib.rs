pub mod sources;

pub use sources::EventRegistrySource;

pub mod prelude {
    pub use super::sources::EventRegistrySource;
    pub use fin_core::{Article, ArticleSource, Error, FeedQuery, Result};
}
