pub mod auth;
pub mod content_type;
pub mod object_key;
