pub mod uploaded_file;
