mod atomic_io;
mod json;

pub use atomic_io::{write_bytes_atomic, write_text_atomic};
pub use json::{read_json_file, write_json_file_atomic, JsonFileError};
