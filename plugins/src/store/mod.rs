mod file;

pub use file::FileLocalStore;
