mod master;
pub(crate) mod signing;

pub use master::Salt;
