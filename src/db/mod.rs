pub mod db;
pub mod disputedb;
pub mod paymentdb;
pub mod profiledb;
pub mod query_timeout;
pub mod reviewdb;
pub mod rotadb;
pub mod shiftdb;
