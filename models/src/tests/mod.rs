mod auth;
mod task;
