//! Undoable command system: commands with absolute deltas, bounded stacks.

pub mod command;
pub mod stack;
