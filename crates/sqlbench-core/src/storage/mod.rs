pub mod files;

pub use files::RunFiles;
