pub mod base;
pub mod command;
pub mod terminal;
