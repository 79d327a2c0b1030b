// File system operations
pub mod scanner;

pub use scanner::FileScanner;
