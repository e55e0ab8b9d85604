pub mod feed_service;
pub mod follow_service;
pub mod media_service;
pub mod pagination;
pub mod post_service;
