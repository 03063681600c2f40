//! Settings types: the descriptor contract and the registry that names them.

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    Conversion, SelectionData, SettingType, Status, Step, SuggestFn, TypeDescriptor,
};
pub use registry::TypeRegistry;
