pub mod formatter;

pub use formatter::MessageFormatter;
