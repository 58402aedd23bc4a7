//! Move files to the Trash through Finder, so they can be put back.
pub mod driver;
pub mod protocol;
pub mod script;
