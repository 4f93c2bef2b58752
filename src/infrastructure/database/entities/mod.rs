pub mod agency;
pub mod reservation;
pub mod vehicle;
