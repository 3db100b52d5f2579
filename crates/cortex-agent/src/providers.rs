pub mod base;
pub mod configs;
pub mod snowflake;

#[cfg(test)]
pub mod mock;
