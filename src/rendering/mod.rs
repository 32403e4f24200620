pub mod camera;
pub mod materials;
pub mod sync;
