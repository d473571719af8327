pub mod analytics;
pub mod auth;
pub mod category;
pub mod swagger_main;
pub mod task;

#[cfg(test)]
pub mod test_util;
