// Resume CRUD over the caller's embedded `resumes` array.

pub mod handlers;
pub mod service;
