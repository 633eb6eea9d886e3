pub mod admin;
pub mod disputes;
pub mod earnings;
pub mod email;
pub mod payments;
pub mod reviews;
pub mod rota;
pub mod shifts;
pub mod timesheets;
