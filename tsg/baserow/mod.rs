pub mod fetch_content;
