mod paths_test;
mod reader_test;
