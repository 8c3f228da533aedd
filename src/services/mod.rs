//! External service clients

pub mod geocoder;
