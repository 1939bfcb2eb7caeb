/// Module for uploading buffers to remote server
pub(crate) mod upload;
