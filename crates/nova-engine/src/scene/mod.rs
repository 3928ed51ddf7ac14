//! Drawable game objects that live on the transform tree.

mod animated;
mod atlas;
mod sprite;

pub use animated::{AnimatedSprite, AnimationEvent};
pub use atlas::SpriteAtlas;
pub use sprite::{Edges, Sprite};
