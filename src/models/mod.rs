pub mod reportmodel;
pub mod rotamodel;
pub mod shiftmodel;
pub mod usermodel;
