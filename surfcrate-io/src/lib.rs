//! File formats for surfcrate
//!
//! - OFF and NOFF point files in, see [`off`]
//! - OBJ meshes in and out, triangle soups out, see [`obj`]

pub mod error;
pub mod obj;
pub mod off;

pub use error::*;
pub use self::obj::{parse_obj, read_obj, save_obj_mesh, save_obj_soup, write_obj_mesh, write_obj_soup};
pub use off::{parse_off, read_off, read_oriented_cloud, save_noff, write_noff, OffPoints};
