mod feed_app;
mod operation;

pub use feed_app::FeedApp;
pub use operation::FeedOperation;
