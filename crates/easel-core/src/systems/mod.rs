/// Asset resolution, font and image caches.
pub mod assets;
