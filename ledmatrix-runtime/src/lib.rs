//! Renders onto an LED matrix through a virtual frame buffer:
//! scenes draw into a [`render::FrameBuffer`], which is diffed against the last frame sent,
//! and only the changed pixels go out to the panel driver.

/// Graphics primitives, such as color and fonts
pub mod graphics;

/// Addresses and sizes on the panel
pub mod layout;

/// Frame buffer, diffing, shapes and text
pub mod render;

/// The control loop that ties a scene, the buffers and a driver together
pub mod host;
