pub mod emaildtos;
pub mod shiftdtos;
