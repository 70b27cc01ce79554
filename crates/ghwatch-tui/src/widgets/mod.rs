pub mod connectivity;
pub mod record_row;
