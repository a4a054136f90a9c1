//! Container files written and read through the filesystem

mod test_container_files;
