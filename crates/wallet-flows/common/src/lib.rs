pub mod error;
pub mod functions;
pub mod graphql;
pub mod invoice;
pub mod rest;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
