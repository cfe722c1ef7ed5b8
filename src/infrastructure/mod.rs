pub mod http;
pub mod local_file;
pub mod memory;
pub mod parsers;
