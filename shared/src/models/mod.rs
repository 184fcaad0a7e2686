//! Domain models

pub mod alert;
pub mod movement;
pub mod product;
pub mod sale;
pub mod user;

pub use alert::*;
pub use movement::*;
pub use product::*;
pub use sale::*;
pub use user::*;
