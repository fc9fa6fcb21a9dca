pub mod health;
pub mod profile_image;
