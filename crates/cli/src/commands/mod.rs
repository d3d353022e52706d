
pub use test::TestCommand;
