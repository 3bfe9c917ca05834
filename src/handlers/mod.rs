pub mod retrieve;
