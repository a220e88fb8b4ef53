pub mod completion;
pub mod verify;
