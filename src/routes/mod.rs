pub mod courts;
