pub mod catalog;
pub mod diversity;
pub mod node;
pub mod params;
pub mod result;

pub use catalog::*;
pub use diversity::*;
pub use node::*;
pub use params::*;
pub use result::*;
