pub mod backup;
pub mod check;
pub mod cleanup;
pub mod connection;
pub mod restore;
pub mod size;
pub mod stream;
