pub mod cart_reader;
pub mod cart_writer;
