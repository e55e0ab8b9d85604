pub mod api_dtos;
pub mod post_dtos;
