pub mod agency;
pub mod principal;
pub mod reservation;
pub mod vehicle;
