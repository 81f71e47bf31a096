pub mod animation;
pub mod audio;
pub mod character;
pub mod collision;
pub mod config;
pub mod endboss;
pub mod enemy;
pub mod hud;
pub mod input;
pub mod level;
pub mod orc;
pub mod projectile;
pub mod render;
pub mod sim;
pub mod sprites;
pub mod timers;
pub mod world;
