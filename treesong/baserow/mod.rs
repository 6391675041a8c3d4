pub mod fetch_rows;
