pub mod compare;
pub mod init;
pub mod predict;
pub mod rank;
pub mod validate;
