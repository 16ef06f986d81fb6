//! C++ code generation modules.

pub mod declarations;
pub mod definitions;
pub mod layout;

pub use declarations::DeclarationGenerator;
pub use definitions::DefinitionGenerator;
