mod filename_test;
mod media_test;
mod subtitle_test;
